//! Workflow execution runtime
//!
//! This crate provides the execution engine that runs workflows, the node
//! registry, and static workflow validation. Every executed node leaves a
//! [`wfcore::Snapshot`] in the [`ExecutionResult`].

mod executor;
mod registry;
mod runtime;
mod validate;

pub use executor::{ExecutionResult, WorkflowExecutor};
pub use registry::{NodeFactory, NodeRegistry, NodeTypeInfo, PortDefinition};
pub use runtime::{FlowRuntime, RuntimeConfig};
pub use validate::validate_workflow;
