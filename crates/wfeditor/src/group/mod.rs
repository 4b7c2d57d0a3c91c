//! Group containers: plugin options, registration and the group/ungroup service

mod config;
mod plugin;
mod service;

pub use config::{GroupPluginConfig, InitGroupJson, GROUP_PLUGIN_OPTIONS};
pub use plugin::{
    GroupPlugin, GROUP_CREATE_COMMAND, GROUP_CREATE_KEYBINDING, GROUP_UNGROUP_COMMAND,
    GROUP_UNGROUP_KEYBINDING,
};
pub use service::{GroupService, GROUP_PADDING};
