use async_trait::async_trait;
use std::collections::HashMap;
use wfcore::{Node, NodeContext, NodeError, NodeOutput, Value};
use wfruntime::{NodeFactory, NodeTypeInfo, PortDefinition};

pub const BRANCH_TRUE: &str = "true";
pub const BRANCH_FALSE: &str = "false";

/// Route execution down the `"true"` or `"false"` branch.
///
/// Reads the input named by config `port` (default `"value"`). With an
/// `equals` config the input is compared against it, otherwise the input's
/// truthiness decides. A missing input is treated as null.
pub struct ConditionNode;

#[async_trait]
impl Node for ConditionNode {
    fn node_type(&self) -> &str {
        "control.condition"
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        let port = ctx
            .config
            .get("port")
            .and_then(|v| v.as_str())
            .unwrap_or("value");
        let input = match ctx.inputs.get(port) {
            Some(value) => value.clone(),
            None => {
                ctx.events
                    .warn(format!("Input '{}' missing, treated as null", port));
                Value::Null
            }
        };

        let passed = match ctx.config.get("equals") {
            Some(expected) => &input == expected,
            None => input.is_truthy(),
        };
        let branch = if passed { BRANCH_TRUE } else { BRANCH_FALSE };
        tracing::debug!(node = %ctx.node_id, port, branch, "Condition evaluated");

        Ok(NodeOutput::new()
            .with_outputs(ctx.inputs.clone())
            .with_data("condition", passed)
            .with_branch(branch))
    }

    fn validate_config(&self, config: &HashMap<String, Value>) -> Result<(), NodeError> {
        match config.get("port") {
            Some(port) if port.as_str().is_none() => Err(NodeError::Configuration(
                "port must be a string".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

pub struct ConditionNodeFactory;

impl NodeFactory for ConditionNodeFactory {
    fn create(&self, _config: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(ConditionNode))
    }

    fn node_type(&self) -> &str {
        "control.condition"
    }

    fn metadata(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Choose the true or false branch".to_string(),
            category: "control".to_string(),
            inputs: vec![PortDefinition::optional("value", "Value to test")],
            outputs: vec![],
        }
    }
}
