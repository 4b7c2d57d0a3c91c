use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use wfcore::{
    snapshots_to_data, ErrorHandling, ExecutionEvent, FlowError, Node, NodeContext, NodeError,
    NodeOutput, NodeSpec, SnapshotData, Value, Workflow, WorkflowError,
};
use wfruntime::{FlowRuntime, NodeFactory, NodeRegistry, RuntimeConfig};

/// Passes inputs through and records how many it saw
struct EchoNode;

#[async_trait]
impl Node for EchoNode {
    fn node_type(&self) -> &str {
        "test.echo"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new()
            .with_data("seen", ctx.inputs.len() as i64)
            .with_outputs(ctx.inputs))
    }
}

/// Reports the branch named in its config
struct BranchNode;

#[async_trait]
impl Node for BranchNode {
    fn node_type(&self) -> &str {
        "test.branch"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let branch = ctx
            .require_config("branch")?
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(NodeOutput::new()
            .with_outputs(ctx.inputs)
            .with_branch(branch))
    }
}

struct FailNode;

#[async_trait]
impl Node for FailNode {
    fn node_type(&self) -> &str {
        "test.fail"
    }

    async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Err(NodeError::ExecutionFailed("boom".to_string()))
    }
}

/// Fails until it has been called `failures` times
struct FlakyNode {
    calls: Arc<AtomicU32>,
    failures: u32,
}

#[async_trait]
impl Node for FlakyNode {
    fn node_type(&self) -> &str {
        "test.flaky"
    }

    async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            Err(NodeError::ExecutionFailed(format!("attempt {}", call)))
        } else {
            Ok(NodeOutput::new().with_output("attempts", call as i64))
        }
    }
}

struct SlowNode;

#[async_trait]
impl Node for SlowNode {
    fn node_type(&self) -> &str {
        "test.slow"
    }

    async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
        Ok(NodeOutput::new())
    }
}

/// Sleeps, then flags that it ran to completion
struct FinishFlagNode {
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl Node for FinishFlagNode {
    fn node_type(&self) -> &str {
        "test.finish_flag"
    }

    async fn execute(&self, _ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        self.finished.store(true, Ordering::SeqCst);
        Ok(NodeOutput::new())
    }
}

struct TestFactory<F> {
    node_type: &'static str,
    make: F,
}

impl<F> NodeFactory for TestFactory<F>
where
    F: Fn() -> Box<dyn Node> + Send + Sync,
{
    fn create(&self, _config: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok((self.make)())
    }

    fn node_type(&self) -> &str {
        self.node_type
    }
}

fn create_test_runtime(flaky_calls: Arc<AtomicU32>) -> FlowRuntime {
    let mut registry = NodeRegistry::new();
    registry.register(Arc::new(TestFactory {
        node_type: "test.echo",
        make: || Box::new(EchoNode) as Box<dyn Node>,
    }));
    registry.register(Arc::new(TestFactory {
        node_type: "test.branch",
        make: || Box::new(BranchNode) as Box<dyn Node>,
    }));
    registry.register(Arc::new(TestFactory {
        node_type: "test.fail",
        make: || Box::new(FailNode) as Box<dyn Node>,
    }));
    registry.register(Arc::new(TestFactory {
        node_type: "test.flaky",
        make: move || {
            Box::new(FlakyNode {
                calls: flaky_calls.clone(),
                failures: 2,
            }) as Box<dyn Node>
        },
    }));
    registry.register(Arc::new(TestFactory {
        node_type: "test.slow",
        make: || Box::new(SlowNode) as Box<dyn Node>,
    }));

    FlowRuntime::with_registry(Arc::new(registry), RuntimeConfig::default())
}

fn inputs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[tokio::test]
async fn test_linear_workflow_snapshots() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("linear");
    let a = workflow.add_node(NodeSpec::new("test.echo"));
    let b = workflow.add_node(NodeSpec::new("test.echo"));
    workflow.connect(a, "x", b, "y");

    let result = runtime
        .execute(&workflow, inputs(&[("x", Value::Number(1.0))]))
        .await
        .unwrap();

    assert_eq!(result.completed_nodes, 2);
    assert_eq!(result.skipped_nodes, 0);
    assert_eq!(
        snapshots_to_data(&result.snapshots),
        vec![
            SnapshotData::new(a)
                .with_input("x", 1.0)
                .with_output("x", 1.0)
                .with_data("seen", 1_i64),
            SnapshotData::new(b)
                .with_input("y", 1.0)
                .with_output("y", 1.0)
                .with_data("seen", 1_i64),
        ]
    );
}

#[tokio::test]
async fn test_branch_gates_downstream_nodes() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("branching");
    let cond = workflow.add_node(NodeSpec::new("test.branch").with_config("branch", "true"));
    let yes = workflow.add_node(NodeSpec::new("test.echo"));
    let no = workflow.add_node(NodeSpec::new("test.echo"));
    let after_no = workflow.add_node(NodeSpec::new("test.echo"));
    workflow.connect_branch(cond, "true", "v", yes, "v");
    workflow.connect_branch(cond, "false", "v", no, "v");
    workflow.connect(no, "v", after_no, "v");

    let result = runtime
        .execute(&workflow, inputs(&[("v", Value::Bool(true))]))
        .await
        .unwrap();

    assert_eq!(result.completed_nodes, 2);
    assert_eq!(result.skipped_nodes, 2);
    assert!(result.snapshot_for(no).is_none());
    assert!(result.snapshot_for(after_no).is_none());

    let data = snapshots_to_data(&result.snapshots);
    assert_eq!(data.len(), 2);
    assert_eq!(data[0].node_id, cond);
    assert_eq!(data[0].branch.as_deref(), Some("true"));
    assert_eq!(data[1].node_id, yes);
    assert_eq!(data[1].branch, None);
}

#[tokio::test]
async fn test_node_with_one_active_input_still_runs() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("merge");
    let cond = workflow.add_node(NodeSpec::new("test.branch").with_config("branch", "false"));
    let merge = workflow.add_node(NodeSpec::new("test.echo"));
    workflow.connect_branch(cond, "true", "v", merge, "from_true");
    workflow.connect_branch(cond, "false", "v", merge, "from_false");

    let result = runtime
        .execute(&workflow, inputs(&[("v", Value::Number(3.0))]))
        .await
        .unwrap();

    let merged = result.snapshot_for(merge).unwrap();
    assert_eq!(merged.inputs.len(), 1);
    assert_eq!(merged.inputs.get("from_false"), Some(&Value::Number(3.0)));
}

#[tokio::test]
async fn test_cycle_rejected() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("cycle");
    let a = workflow.add_node(NodeSpec::new("test.echo"));
    let b = workflow.add_node(NodeSpec::new("test.echo"));
    workflow.connect(a, "x", b, "x");
    workflow.connect(b, "x", a, "x");

    let err = runtime.execute(&workflow, HashMap::new()).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::Workflow(WorkflowError::CyclicDependency)
    ));
}

#[tokio::test]
async fn test_unknown_node_type() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("unknown");
    workflow.add_node(NodeSpec::new("does.not.exist"));

    let err = runtime.execute(&workflow, HashMap::new()).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::Workflow(WorkflowError::UnknownNodeType(t)) if t == "does.not.exist"
    ));
}

#[tokio::test]
async fn test_failure_stops_workflow() {
    let runtime = create_test_runtime(Arc::default());
    let mut events = runtime.subscribe_events();
    let mut workflow = Workflow::new("fail");
    let failing = workflow.add_node(NodeSpec::new("test.fail"));

    let err = runtime.execute(&workflow, HashMap::new()).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::NodeFailed { node, source: NodeError::ExecutionFailed(_) } if node == failing
    ));

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let ExecutionEvent::NodeFailed { node_id, .. } = event {
            assert_eq!(node_id, failing);
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test]
async fn test_failure_aborts_running_nodes() {
    let finished = Arc::new(AtomicBool::new(false));
    let flag = finished.clone();
    let mut registry = NodeRegistry::new();
    registry.register(Arc::new(TestFactory {
        node_type: "test.fail",
        make: || Box::new(FailNode) as Box<dyn Node>,
    }));
    registry.register(Arc::new(TestFactory {
        node_type: "test.finish_flag",
        make: move || {
            Box::new(FinishFlagNode {
                finished: flag.clone(),
            }) as Box<dyn Node>
        },
    }));
    let runtime = FlowRuntime::with_registry(Arc::new(registry), RuntimeConfig::default());

    let mut workflow = Workflow::new("abort");
    workflow.add_node(NodeSpec::new("test.fail"));
    workflow.add_node(NodeSpec::new("test.finish_flag"));

    let err = runtime.execute(&workflow, HashMap::new()).await.unwrap_err();
    assert!(matches!(err, FlowError::NodeFailed { .. }));

    tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;
    assert!(!finished.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_continue_on_error_records_error_snapshot() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("continue");
    workflow.settings.on_error = ErrorHandling::ContinueOnError;
    let failing = workflow.add_node(NodeSpec::new("test.fail"));
    let after = workflow.add_node(NodeSpec::new("test.echo"));
    workflow.connect(failing, "out", after, "in");

    let result = runtime.execute(&workflow, HashMap::new()).await.unwrap();

    assert_eq!(result.completed_nodes, 2);
    let failed = result.snapshot_for(failing).unwrap();
    assert_eq!(
        failed.data.get("error"),
        Some(&Value::String("Execution failed: boom".to_string()))
    );
    assert!(result.snapshot_for(after).unwrap().inputs.is_empty());
}

#[tokio::test]
async fn test_retry_policy_retries_until_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let runtime = create_test_runtime(calls.clone());
    let mut workflow = Workflow::new("retry");
    let flaky = workflow.add_node(NodeSpec::new("test.flaky").with_retry(3, 1));

    let result = runtime.execute(&workflow, HashMap::new()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        result.snapshot_for(flaky).unwrap().outputs.get("attempts"),
        Some(&Value::Number(3.0))
    );
}

#[tokio::test]
async fn test_timeout_fails_node() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("timeout");
    workflow.settings.max_execution_time_ms = Some(20);
    workflow.settings.on_error = ErrorHandling::ContinueOnError;
    let slow = workflow.add_node(NodeSpec::new("test.slow"));

    let result = runtime.execute(&workflow, HashMap::new()).await.unwrap();

    assert_eq!(
        result.snapshot_for(slow).unwrap().data.get("error"),
        Some(&Value::String("Timeout after 20ms".to_string()))
    );
}

#[tokio::test]
async fn test_registered_workflow_lookup() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("registered");
    workflow.add_node(NodeSpec::new("test.echo"));
    let id = runtime.register_workflow(workflow).await.unwrap();
    assert_eq!(runtime.workflow(id).await.unwrap().name, "registered");

    let result = runtime.execute_workflow(id, HashMap::new()).await.unwrap();
    assert_eq!(result.total_nodes, 1);

    let missing = runtime
        .execute_workflow(uuid::Uuid::new_v4(), HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(
        missing,
        FlowError::Workflow(WorkflowError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_invalid_workflow_not_registered() {
    let runtime = create_test_runtime(Arc::default());
    let mut workflow = Workflow::new("invalid");
    let a = workflow.add_node(NodeSpec::new("test.echo"));
    workflow.add_node(NodeSpec::new("does.not.exist").with_parent(a));
    let id = workflow.id;

    let err = runtime.register_workflow(workflow).await.unwrap_err();

    assert!(matches!(
        err,
        FlowError::Rejected(problems)
            if problems == vec![WorkflowError::UnknownNodeType("does.not.exist".to_string())]
    ));
    assert!(runtime.workflow(id).await.is_none());
}
