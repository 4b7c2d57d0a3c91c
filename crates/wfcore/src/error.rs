use crate::{NodeId, WorkflowId};
use thiserror::Error;

/// Why a run, or loading the things a run needs, failed
#[derive(Error, Debug)]
pub enum FlowError {
    /// A node failed under `ErrorHandling::StopWorkflow`
    #[error("Node {node} failed: {source}")]
    NodeFailed {
        node: NodeId,
        #[source]
        source: NodeError,
    },

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("Workflow rejected with {} problem(s)", .0.len())]
    Rejected(Vec<WorkflowError>),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure reported by a single node. Recorded verbatim in error snapshots.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Missing required input: {0}")]
    MissingInput(String),

    #[error("Invalid input type for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Node initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Timeout after {millis}ms")]
    Timeout { millis: u64 },

    #[error("Cancelled")]
    Cancelled,
}

/// Structural problem in a workflow document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    NotFound(WorkflowId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Invalid config for {node_type}: {source}")]
    InvalidConfig {
        node_type: String,
        #[source]
        source: NodeError,
    },

    #[error("Connection {from} -> {to} references a missing node")]
    InvalidConnection { from: NodeId, to: NodeId },

    #[error("Cyclic dependency detected")]
    CyclicDependency,

    #[error("Node {node} references missing parent {parent}")]
    MissingParent { node: NodeId, parent: NodeId },

    #[error("Node {0} is contained in itself through its parent chain")]
    ParentCycle(NodeId),
}
