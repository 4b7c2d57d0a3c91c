use async_trait::async_trait;
use std::collections::HashMap;
use wfcore::{Node, NodeContext, NodeError, NodeOutput, Value};
use wfruntime::{NodeFactory, NodeTypeInfo, PortDefinition};

/// Logs its inputs and forwards `message`
pub struct DebugNode;

#[async_trait]
impl Node for DebugNode {
    fn node_type(&self) -> &str {
        "debug.log"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let message = ctx
            .inputs
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("(no message)");

        tracing::debug!(node = %ctx.node_id, "{}", message);
        ctx.events.info(format!("DEBUG: {}", message));

        let mut keys: Vec<&String> = ctx.inputs.keys().collect();
        keys.sort();
        for key in &keys {
            ctx.events.info(format!("  {}: {:?}", key, ctx.inputs[key.as_str()]));
        }

        Ok(NodeOutput::new()
            .with_output("message", message.to_string())
            .with_data("logged", keys.len() as i64))
    }
}

pub struct DebugNodeFactory;

impl NodeFactory for DebugNodeFactory {
    fn create(&self, _config: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(DebugNode))
    }

    fn node_type(&self) -> &str {
        "debug.log"
    }

    fn metadata(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Logs input values for debugging".to_string(),
            category: "debug".to_string(),
            inputs: vec![PortDefinition::optional("message", "Text to log")],
            outputs: vec![PortDefinition::required("message", "The logged text")],
        }
    }
}
