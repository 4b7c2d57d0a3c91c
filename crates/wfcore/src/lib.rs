//! Core abstractions for the workflow engine
//!
//! Types and traits shared by the runtime, the node library and the editor:
//! values, workflow JSON, the node trait, execution events and snapshots.

mod error;
pub mod events;
mod node;
pub mod snapshot;
mod value;
mod workflow;

pub use error::{FlowError, NodeError, WorkflowError};
pub use events::{EventBus, EventEmitter, ExecutionEvent, ExecutionId, NodeEvent};
pub use node::{Node, NodeContext, NodeOutput};
pub use snapshot::{snapshots_to_data, Snapshot, SnapshotData, SnapshotId, SnapshotView};
pub use value::Value;
pub use workflow::{
    Connection, ErrorHandling, NodeId, NodeSpec, Position, RetryPolicy, Workflow, WorkflowId,
    WorkflowSettings,
};
