use crate::{ConfigRegistry, PluginError, RenderRegistry, ShortcutRegistry};
use std::collections::HashSet;
use wfruntime::NodeRegistry;

/// Editor extension registered once at startup
pub trait Plugin {
    fn name(&self) -> &str;

    fn register(&self, ctx: &mut PluginContext) -> Result<(), PluginError>;
}

/// Everything a plugin may contribute to
#[derive(Default)]
pub struct PluginContext {
    pub configs: ConfigRegistry,
    pub nodes: NodeRegistry,
    pub renders: RenderRegistry,
    pub shortcuts: ShortcutRegistry,
}

impl PluginContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing node registry, e.g. one holding the standard nodes
    pub fn with_nodes(nodes: NodeRegistry) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub struct PluginHost {
    context: PluginContext,
    registered: HashSet<String>,
}

impl PluginHost {
    pub fn new(context: PluginContext) -> Self {
        Self {
            context,
            registered: HashSet::new(),
        }
    }

    pub fn register(&mut self, plugin: &dyn Plugin) -> Result<(), PluginError> {
        let name = plugin.name().to_string();
        if self.registered.contains(&name) {
            return Err(PluginError::DuplicatePlugin(name));
        }
        plugin.register(&mut self.context)?;
        tracing::info!("Registered plugin: {}", name);
        self.registered.insert(name);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    pub fn into_context(self) -> PluginContext {
        self.context
    }
}
