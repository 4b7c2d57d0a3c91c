use super::{GroupPluginConfig, GROUP_PLUGIN_OPTIONS};
use crate::{Plugin, PluginContext, PluginError, Shortcut};
use std::sync::Arc;
use wfnodes::{GroupNodeFactory, GROUP_NODE_TYPE};

pub const GROUP_CREATE_COMMAND: &str = "group.create";
pub const GROUP_UNGROUP_COMMAND: &str = "group.ungroup";

pub const GROUP_CREATE_KEYBINDING: &str = "mod+g";
pub const GROUP_UNGROUP_KEYBINDING: &str = "mod+shift+g";

/// Adds group containers to the editor
pub struct GroupPlugin {
    config: GroupPluginConfig,
}

impl GroupPlugin {
    pub fn new(config: GroupPluginConfig) -> Self {
        Self { config }
    }
}

impl Plugin for GroupPlugin {
    fn name(&self) -> &str {
        "group"
    }

    fn register(&self, ctx: &mut PluginContext) -> Result<(), PluginError> {
        // a rejected config must leave the context untouched
        let render = match (
            self.config.disable_group_node_register,
            &self.config.group_node_render,
        ) {
            (true, _) => None,
            (false, Some(render)) => Some(render.clone()),
            (false, None) => return Err(PluginError::MissingRender(GROUP_NODE_TYPE)),
        };
        if ctx.configs.contains(&GROUP_PLUGIN_OPTIONS) {
            return Err(PluginError::DuplicateConfig(GROUP_PLUGIN_OPTIONS.name()));
        }
        if render.is_some() && ctx.renders.get(GROUP_NODE_TYPE).is_some() {
            return Err(PluginError::DuplicateRender(GROUP_NODE_TYPE.to_string()));
        }
        if !self.config.disable_group_shortcuts {
            for keybinding in [GROUP_CREATE_KEYBINDING, GROUP_UNGROUP_KEYBINDING] {
                if ctx.shortcuts.command_for(keybinding).is_some() {
                    return Err(PluginError::DuplicateShortcut(keybinding.to_string()));
                }
            }
        }

        if let Some(render) = render {
            ctx.renders.register(GROUP_NODE_TYPE, render)?;
            ctx.nodes.register(Arc::new(GroupNodeFactory));
        } else {
            tracing::debug!("Group node registration disabled");
        }

        if self.config.disable_group_shortcuts {
            tracing::debug!("Group shortcuts disabled");
        } else {
            ctx.shortcuts
                .register(Shortcut::new(GROUP_CREATE_KEYBINDING, GROUP_CREATE_COMMAND))?;
            ctx.shortcuts
                .register(Shortcut::new(GROUP_UNGROUP_KEYBINDING, GROUP_UNGROUP_COMMAND))?;
        }

        ctx.configs
            .insert(&GROUP_PLUGIN_OPTIONS, self.config.clone())?;
        Ok(())
    }
}
