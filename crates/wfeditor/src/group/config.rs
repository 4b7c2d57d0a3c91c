use crate::{ConfigKey, NodeRender};
use std::fmt;
use std::sync::Arc;
use wfcore::NodeSpec;

/// Hook that shapes a new group node.
///
/// Receives the proposed group node and the nodes being grouped and returns
/// the node to insert. Must be deterministic; the children are read-only.
pub type InitGroupJson = dyn Fn(NodeSpec, &[NodeSpec]) -> NodeSpec + Send + Sync;

/// Registry slot holding the active [`GroupPluginConfig`]
pub const GROUP_PLUGIN_OPTIONS: ConfigKey<GroupPluginConfig> =
    ConfigKey::new("workflow.group_plugin_options");

/// Options of the group plugin, read once when the plugin registers.
///
/// Carries no validation of its own. A config without a render is a valid
/// value; the plugin only insists on one when it has to register the group
/// node type.
#[derive(Clone, Default)]
pub struct GroupPluginConfig {
    pub group_node_render: Option<Arc<dyn NodeRender>>,
    pub disable_group_shortcuts: bool,
    pub disable_group_node_register: bool,
    pub init_group_json: Option<Arc<InitGroupJson>>,
}

impl GroupPluginConfig {
    pub fn new(render: impl NodeRender + 'static) -> Self {
        Self::default().with_render(render)
    }

    pub fn with_render(mut self, render: impl NodeRender + 'static) -> Self {
        self.group_node_render = Some(Arc::new(render));
        self
    }

    pub fn with_init_group_json<F>(mut self, init: F) -> Self
    where
        F: Fn(NodeSpec, &[NodeSpec]) -> NodeSpec + Send + Sync + 'static,
    {
        self.init_group_json = Some(Arc::new(init));
        self
    }

    pub fn disable_shortcuts(mut self) -> Self {
        self.disable_group_shortcuts = true;
        self
    }

    pub fn disable_node_register(mut self) -> Self {
        self.disable_group_node_register = true;
        self
    }
}

impl fmt::Debug for GroupPluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupPluginConfig")
            .field("group_node_render", &self.group_node_render.is_some())
            .field("disable_group_shortcuts", &self.disable_group_shortcuts)
            .field("disable_group_node_register", &self.disable_group_node_register)
            .field("init_group_json", &self.init_group_json.is_some())
            .finish()
    }
}
