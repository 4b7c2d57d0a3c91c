use thiserror::Error;
use wfcore::NodeId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PluginError {
    #[error("Plugin already registered: {0}")]
    DuplicatePlugin(String),

    #[error("Config already registered: {0}")]
    DuplicateConfig(&'static str),

    #[error("Render already registered for node type: {0}")]
    DuplicateRender(String),

    #[error("Keybinding already bound: {0}")]
    DuplicateShortcut(String),

    #[error("No render supplied for node type: {0}")]
    MissingRender(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupError {
    #[error("Group plugin is not registered")]
    NotConfigured,

    #[error("Cannot create a group from an empty selection")]
    EmptySelection,

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node selected more than once: {0}")]
    DuplicateSelection(NodeId),

    #[error("Selected nodes belong to different containers")]
    MixedParents,

    #[error("Node {0} is not a group")]
    NotAGroup(NodeId),
}
