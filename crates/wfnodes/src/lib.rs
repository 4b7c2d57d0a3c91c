//! Standard node library
//!
//! Collection of built-in nodes for common operations

mod condition;
mod debug;
mod group;
mod time;
mod transform;

pub use condition::{ConditionNode, ConditionNodeFactory, BRANCH_FALSE, BRANCH_TRUE};
pub use debug::DebugNode;
pub use group::{GroupNode, GroupNodeFactory, GROUP_NODE_TYPE};
pub use time::DelayNode;
pub use transform::{JsonParseNode, JsonStringifyNode};
use wfruntime::NodeRegistry;

use std::sync::Arc;

/// Register the standard nodes. The group container is left to the group
/// plugin, which may be configured to skip it.
pub fn register_all(registry: &mut NodeRegistry) {
    registry.register(Arc::new(debug::DebugNodeFactory));
    registry.register(Arc::new(transform::JsonParseNodeFactory));
    registry.register(Arc::new(transform::JsonStringifyNodeFactory));
    registry.register(Arc::new(time::DelayNodeFactory));
    registry.register(Arc::new(condition::ConditionNodeFactory));
}
