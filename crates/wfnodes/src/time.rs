use async_trait::async_trait;
use std::collections::HashMap;
use tokio::time::{sleep, Duration};
use wfcore::{Node, NodeContext, NodeError, NodeOutput, Value};
use wfruntime::{NodeFactory, NodeTypeInfo};

/// Delay execution for a configured duration, passing inputs through
pub struct DelayNode;

#[async_trait]
impl Node for DelayNode {
    fn node_type(&self) -> &str {
        "time.delay"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let delay_ms = ctx
            .config
            .get("delay_ms")
            .and_then(|v| v.as_f64())
            .unwrap_or(1000.0) as u64;

        ctx.events.info(format!("Delaying for {}ms", delay_ms));

        tokio::select! {
            _ = sleep(Duration::from_millis(delay_ms)) => {}
            _ = ctx.cancellation.cancelled() => {
                ctx.events.warn("Delay cancelled");
                return Err(NodeError::Cancelled);
            }
        }
        ctx.events.progress(100.0, Some(format!("Waited {}ms", delay_ms)));

        Ok(NodeOutput::new()
            .with_outputs(ctx.inputs.clone())
            .with_data("delay_ms", delay_ms as i64))
    }

    fn validate_config(&self, config: &HashMap<String, Value>) -> Result<(), NodeError> {
        match config.get("delay_ms") {
            Some(v) if !matches!(v.as_f64(), Some(ms) if ms >= 0.0) => Err(NodeError::Configuration(
                "delay_ms must be a non-negative number".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

pub struct DelayNodeFactory;

impl NodeFactory for DelayNodeFactory {
    fn create(&self, _config: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(DelayNode))
    }

    fn node_type(&self) -> &str {
        "time.delay"
    }

    fn metadata(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Delay execution for specified milliseconds".to_string(),
            category: "time".to_string(),
            inputs: vec![],
            outputs: vec![],
        }
    }
}
