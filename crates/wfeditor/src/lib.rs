//! Editor-side plugin host
//!
//! Plugins contribute node types, renders, keyboard shortcuts and typed
//! options to a [`PluginContext`]. The [`group`] plugin adds group
//! containers and the service that creates and dissolves them.

mod config;
mod error;
pub mod group;
mod plugin;
mod render;
mod shortcuts;

pub use config::{ConfigKey, ConfigRegistry};
pub use error::{GroupError, PluginError};
pub use plugin::{Plugin, PluginContext, PluginHost};
pub use render::{NodeRender, RenderRegistry, TextGroupRender};
pub use shortcuts::{Shortcut, ShortcutRegistry};
