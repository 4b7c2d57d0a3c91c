use crate::registry::NodeRegistry;
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Duration};
use tokio_util::sync::CancellationToken;
use wfcore::{
    ErrorHandling, EventBus, ExecutionEvent, ExecutionId, FlowError, Node, NodeContext, NodeError,
    NodeId, NodeOutput, RetryPolicy, Snapshot, Value, Workflow, WorkflowError,
};

/// Executes workflows as DAGs with parallel execution
pub struct WorkflowExecutor {
    max_parallel: usize,
}

/// Bookkeeping for one run of `execute_dag`
#[derive(Default)]
struct RunState {
    running: HashSet<NodeId>,
    completed: HashSet<NodeId>,
    skipped: HashSet<NodeId>,
    branches: HashMap<NodeId, Option<String>>,
    outputs: HashMap<NodeId, HashMap<String, Value>>,
    snapshots: Vec<Snapshot>,
}

impl RunState {
    fn is_settled(&self, node_id: &NodeId) -> bool {
        self.completed.contains(node_id) || self.skipped.contains(node_id)
    }
}

struct TaskResult {
    node_id: NodeId,
    inputs: HashMap<String, Value>,
    result: Result<NodeOutput, NodeError>,
    started_at: DateTime<Utc>,
    duration_ms: u64,
}

impl WorkflowExecutor {
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
        }
    }

    /// Execute a workflow and return results
    pub async fn execute(
        &self,
        workflow: &Workflow,
        registry: &NodeRegistry,
        event_bus: &EventBus,
        initial_inputs: HashMap<String, Value>,
    ) -> Result<ExecutionResult, FlowError> {
        let execution_id = ExecutionId::new_v4();
        let start_time = Instant::now();

        event_bus.emit(ExecutionEvent::WorkflowStarted {
            execution_id,
            workflow_id: workflow.id,
            timestamp: Utc::now(),
        });

        tracing::info!(workflow = %workflow.id, execution = %execution_id, "Starting workflow execution");

        let result = self
            .run(workflow, registry, event_bus, execution_id, initial_inputs)
            .await;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        event_bus.emit(ExecutionEvent::WorkflowCompleted {
            execution_id,
            success: result.is_ok(),
            duration_ms,
            timestamp: Utc::now(),
        });

        result
    }

    async fn run(
        &self,
        workflow: &Workflow,
        registry: &NodeRegistry,
        event_bus: &EventBus,
        execution_id: ExecutionId,
        initial_inputs: HashMap<String, Value>,
    ) -> Result<ExecutionResult, FlowError> {
        check_graph(workflow)?;

        let mut node_instances = HashMap::new();
        for node_spec in &workflow.nodes {
            let mut node = registry.create_node(&node_spec.node_type, &node_spec.config)?;

            if let Err(e) = node.initialize().await {
                tracing::error!("Failed to initialize node {}: {}", node_spec.id, e);
                return Err(FlowError::NodeFailed {
                    node: node_spec.id,
                    source: e,
                });
            }

            node_instances.insert(node_spec.id, node);
        }

        self.execute_dag(workflow, node_instances, event_bus, execution_id, initial_inputs)
            .await
    }

    async fn execute_dag(
        &self,
        workflow: &Workflow,
        mut node_instances: HashMap<NodeId, Box<dyn Node>>,
        event_bus: &EventBus,
        execution_id: ExecutionId,
        initial_inputs: HashMap<String, Value>,
    ) -> Result<ExecutionResult, FlowError> {
        let mut state = RunState::default();
        let mut running: FuturesUnordered<JoinHandle<TaskResult>> = FuturesUnordered::new();
        let cancel = CancellationToken::new();
        let max_parallel = self
            .max_parallel
            .min(workflow.settings.max_parallel_nodes.max(1));

        loop {
            // Skipping a node can make its successors ready, so settle those first
            let mut spawned_or_skipped = true;
            while spawned_or_skipped {
                spawned_or_skipped = false;

                for node_id in self.find_ready_nodes(workflow, &state) {
                    if !has_active_input(workflow, node_id, &state) {
                        tracing::debug!("Skipping node {}: no active branch", node_id);
                        event_bus.emit(ExecutionEvent::NodeSkipped {
                            execution_id,
                            node_id,
                            timestamp: Utc::now(),
                        });
                        state.skipped.insert(node_id);
                        spawned_or_skipped = true;
                        continue;
                    }

                    if running.len() >= max_parallel {
                        continue;
                    }

                    let (node_spec, node) =
                        match (workflow.find_node(node_id), node_instances.remove(&node_id)) {
                            (Some(spec), Some(node)) => (spec, node),
                            _ => {
                                stop_in_flight(&running, &cancel);
                                return Err(WorkflowError::NodeNotFound(node_id).into());
                            }
                        };

                    let inputs = collect_node_inputs(node_id, workflow, &state, &initial_inputs);
                    let ctx = NodeContext {
                        node_id,
                        inputs: inputs.clone(),
                        config: node_spec.config.clone(),
                        events: event_bus.create_emitter(execution_id, node_id),
                        cancellation: cancel.child_token(),
                    };

                    event_bus.emit(ExecutionEvent::NodeStarted {
                        execution_id,
                        node_id,
                        node_type: node_spec.node_type.clone(),
                        timestamp: Utc::now(),
                    });

                    let retry = node_spec.retry_policy.clone();
                    let time_limit = workflow.settings.max_execution_time_ms;
                    let task = async move {
                        let started_at = Utc::now();
                        let start = Instant::now();
                        let result = run_with_retry(node.as_ref(), ctx, retry, time_limit).await;
                        TaskResult {
                            node_id,
                            inputs,
                            result,
                            started_at,
                            duration_ms: start.elapsed().as_millis() as u64,
                        }
                    };

                    state.running.insert(node_id);
                    running.push(tokio::spawn(task));
                    spawned_or_skipped = true;
                }
            }

            if running.is_empty() {
                break;
            }

            if let Some(joined) = running.next().await {
                let recorded = joined
                    .map_err(|e| FlowError::Execution(format!("Task join error: {}", e)))
                    .and_then(|finished| {
                        self.record(workflow, event_bus, execution_id, &mut state, finished)
                    });
                if let Err(e) = recorded {
                    stop_in_flight(&running, &cancel);
                    return Err(e);
                }
            }
        }

        Ok(ExecutionResult {
            execution_id,
            completed_nodes: state.completed.len(),
            skipped_nodes: state.skipped.len(),
            total_nodes: workflow.nodes.len(),
            outputs: state.outputs,
            snapshots: state.snapshots,
        })
    }

    /// Fold a finished task into the run state, emitting events and a snapshot
    fn record(
        &self,
        workflow: &Workflow,
        event_bus: &EventBus,
        execution_id: ExecutionId,
        state: &mut RunState,
        finished: TaskResult,
    ) -> Result<(), FlowError> {
        let TaskResult {
            node_id,
            inputs,
            result,
            started_at,
            duration_ms,
        } = finished;
        state.running.remove(&node_id);

        match result {
            Ok(output) => {
                tracing::info!("Node {} completed in {}ms", node_id, duration_ms);

                event_bus.emit(ExecutionEvent::NodeCompleted {
                    execution_id,
                    node_id,
                    outputs: output.outputs.clone(),
                    branch: output.branch.clone(),
                    duration_ms,
                    timestamp: Utc::now(),
                });

                state.snapshots.push(Snapshot {
                    id: uuid::Uuid::new_v4(),
                    node_id,
                    inputs,
                    outputs: output.outputs.clone(),
                    data: output.data,
                    branch: output.branch.clone(),
                    started_at,
                    duration_ms,
                });
                state.branches.insert(node_id, output.branch);
                state.outputs.insert(node_id, output.outputs);
                state.completed.insert(node_id);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Node {} failed: {}", node_id, e);

                event_bus.emit(ExecutionEvent::NodeFailed {
                    execution_id,
                    node_id,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });

                match workflow.settings.on_error {
                    ErrorHandling::StopWorkflow => Err(FlowError::NodeFailed {
                        node: node_id,
                        source: e,
                    }),
                    ErrorHandling::ContinueOnError => {
                        let mut snapshot = Snapshot::new(node_id).with_data("error", e.to_string());
                        snapshot.inputs = inputs;
                        snapshot.started_at = started_at;
                        snapshot.duration_ms = duration_ms;
                        state.snapshots.push(snapshot);
                        state.branches.insert(node_id, None);
                        state.completed.insert(node_id);
                        Ok(())
                    }
                }
            }
        }
    }

    /// Nodes whose predecessors have all settled, in workflow order
    fn find_ready_nodes(&self, workflow: &Workflow, state: &RunState) -> Vec<NodeId> {
        workflow
            .nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !state.is_settled(id) && !state.running.contains(id))
            .filter(|id| {
                workflow
                    .connections
                    .iter()
                    .filter(|c| c.to_node == *id)
                    .all(|c| state.is_settled(&c.from_node))
            })
            .collect()
    }
}

/// Signal every running node to stop and abort its task. A dropped
/// `JoinHandle` only detaches the task, so it has to be aborted explicitly.
fn stop_in_flight(
    running: &FuturesUnordered<JoinHandle<TaskResult>>,
    cancel: &CancellationToken,
) {
    cancel.cancel();
    for handle in running.iter() {
        handle.abort();
    }
    if !running.is_empty() {
        tracing::warn!("Aborted {} running node(s)", running.len());
    }
}

/// Reject dangling connections and cycles before any node is created
fn check_graph(workflow: &Workflow) -> Result<(), WorkflowError> {
    let mut graph = DiGraph::<NodeId, ()>::new();
    let mut node_to_index = HashMap::new();

    for node_spec in &workflow.nodes {
        let idx = graph.add_node(node_spec.id);
        node_to_index.insert(node_spec.id, idx);
    }

    for conn in &workflow.connections {
        let from_idx = node_to_index
            .get(&conn.from_node)
            .ok_or(WorkflowError::NodeNotFound(conn.from_node))?;
        let to_idx = node_to_index
            .get(&conn.to_node)
            .ok_or(WorkflowError::NodeNotFound(conn.to_node))?;

        graph.add_edge(*from_idx, *to_idx, ());
    }

    if toposort(&graph, None).is_err() {
        return Err(WorkflowError::CyclicDependency);
    }

    Ok(())
}

/// A node with incoming connections runs only if at least one of them is active
fn has_active_input(workflow: &Workflow, node_id: NodeId, state: &RunState) -> bool {
    let mut incoming = workflow
        .connections
        .iter()
        .filter(|c| c.to_node == node_id)
        .peekable();

    if incoming.peek().is_none() {
        return true;
    }

    incoming.any(|c| {
        !state.skipped.contains(&c.from_node)
            && c.is_active(
                state
                    .branches
                    .get(&c.from_node)
                    .and_then(|b| b.as_deref()),
            )
    })
}

/// Inputs for a node: workflow inputs for entry nodes, plus values on active connections
fn collect_node_inputs(
    node_id: NodeId,
    workflow: &Workflow,
    state: &RunState,
    initial_inputs: &HashMap<String, Value>,
) -> HashMap<String, Value> {
    let mut inputs = HashMap::new();

    let has_predecessors = workflow.connections.iter().any(|c| c.to_node == node_id);
    if !has_predecessors {
        inputs.extend(initial_inputs.clone());
    }

    for conn in workflow.connections.iter().filter(|c| c.to_node == node_id) {
        if state.skipped.contains(&conn.from_node) {
            continue;
        }
        let branch = state.branches.get(&conn.from_node).and_then(|b| b.as_deref());
        if !conn.is_active(branch) {
            continue;
        }
        if let Some(value) = state
            .outputs
            .get(&conn.from_node)
            .and_then(|outputs| outputs.get(&conn.from_port))
        {
            inputs.insert(conn.to_port.clone(), value.clone());
        }
    }

    inputs
}

/// Run a node, honouring its retry policy and the per-node time limit
async fn run_with_retry(
    node: &dyn Node,
    ctx: NodeContext,
    retry: Option<RetryPolicy>,
    time_limit_ms: Option<u64>,
) -> Result<NodeOutput, NodeError> {
    let max_attempts = retry.as_ref().map_or(1, |r| r.max_attempts.max(1));
    let mut delay_ms = retry.as_ref().map_or(0, |r| r.delay_ms) as f64;
    let mut attempt = 1;

    loop {
        let result = match time_limit_ms {
            Some(millis) => {
                match timeout(Duration::from_millis(millis), node.execute(ctx.clone())).await {
                    Ok(result) => result,
                    Err(_) => Err(NodeError::Timeout { millis }),
                }
            }
            None => node.execute(ctx.clone()).await,
        };

        match result {
            Ok(output) => return Ok(output),
            Err(e) if attempt < max_attempts && !ctx.cancellation.is_cancelled() => {
                tracing::warn!(
                    "Node {} attempt {}/{} failed: {}",
                    ctx.node_id,
                    attempt,
                    max_attempts,
                    e
                );
                sleep(Duration::from_millis(delay_ms as u64)).await;
                delay_ms *= retry.as_ref().map_or(1.0, |r| r.backoff_multiplier);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Result of workflow execution
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub execution_id: ExecutionId,
    pub outputs: HashMap<NodeId, HashMap<String, Value>>,
    /// One snapshot per executed node, in completion order
    pub snapshots: Vec<Snapshot>,
    pub completed_nodes: usize,
    pub skipped_nodes: usize,
    pub total_nodes: usize,
}

impl ExecutionResult {
    pub fn snapshot_for(&self, node_id: NodeId) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.node_id == node_id)
    }
}
