use crate::{registry::NodeRegistry, validate_workflow, ExecutionResult, WorkflowExecutor};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use wfcore::{EventBus, ExecutionEvent, FlowError, Value, Workflow, WorkflowError, WorkflowId};

/// Registry, executor and event bus behind one handle, plus a store of
/// validated workflows that can be run by id
pub struct FlowRuntime {
    registry: Arc<NodeRegistry>,
    executor: WorkflowExecutor,
    event_bus: EventBus,
    workflows: RwLock<HashMap<WorkflowId, Arc<Workflow>>>,
}

impl FlowRuntime {
    pub fn with_registry(registry: Arc<NodeRegistry>, config: RuntimeConfig) -> Self {
        Self {
            registry,
            executor: WorkflowExecutor::new(config.max_parallel_nodes),
            event_bus: EventBus::new(config.event_buffer_size),
            workflows: RwLock::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Store a workflow for later runs. It is checked against the registry
    /// first and every problem found is returned; a rejected workflow is not stored.
    pub async fn register_workflow(&self, workflow: Workflow) -> Result<WorkflowId, FlowError> {
        let problems = validate_workflow(&workflow, &self.registry);
        if !problems.is_empty() {
            tracing::warn!(
                workflow = %workflow.id,
                "Workflow rejected with {} problem(s)",
                problems.len()
            );
            return Err(FlowError::Rejected(problems));
        }

        let id = workflow.id;
        let replaced = self
            .workflows
            .write()
            .await
            .insert(id, Arc::new(workflow))
            .is_some();
        tracing::info!(workflow = %id, replaced, "Workflow registered");
        Ok(id)
    }

    pub async fn workflow(&self, workflow_id: WorkflowId) -> Option<Arc<Workflow>> {
        self.workflows.read().await.get(&workflow_id).cloned()
    }

    /// Run a registered workflow. The store is not locked while it runs.
    pub async fn execute_workflow(
        &self,
        workflow_id: WorkflowId,
        inputs: HashMap<String, Value>,
    ) -> Result<ExecutionResult, FlowError> {
        let workflow = self
            .workflow(workflow_id)
            .await
            .ok_or(WorkflowError::NotFound(workflow_id))?;
        self.execute(&workflow, inputs).await
    }

    /// Run a workflow that was never registered
    pub async fn execute(
        &self,
        workflow: &Workflow,
        inputs: HashMap<String, Value>,
    ) -> Result<ExecutionResult, FlowError> {
        self.executor
            .execute(workflow, &self.registry, &self.event_bus, inputs)
            .await
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ExecutionEvent> {
        self.event_bus.subscribe()
    }
}

/// Runtime limits, loadable from JSON. Missing keys keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Upper bound on nodes running at once; a workflow may lower it further
    pub max_parallel_nodes: usize,
    /// Events a slow subscriber may fall behind before it starts missing some
    pub event_buffer_size: usize,
}

impl RuntimeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_parallel_nodes: 10,
            event_buffer_size: 1000,
        }
    }
}
