use async_trait::async_trait;
use std::collections::HashMap;
use wfcore::{Node, NodeContext, NodeError, NodeOutput, Value};
use wfruntime::{NodeFactory, NodeTypeInfo};

/// Node type of group containers
pub const GROUP_NODE_TYPE: &str = "group";

/// Container for other nodes. Children run as ordinary nodes, so at
/// execution time the group itself only forwards whatever reaches it.
pub struct GroupNode;

#[async_trait]
impl Node for GroupNode {
    fn node_type(&self) -> &str {
        GROUP_NODE_TYPE
    }

    async fn execute(&self, ctx: NodeContext) -> Result<NodeOutput, NodeError> {
        Ok(NodeOutput::new().with_outputs(ctx.inputs))
    }
}

pub struct GroupNodeFactory;

impl NodeFactory for GroupNodeFactory {
    fn create(&self, _config: &HashMap<String, Value>) -> Result<Box<dyn Node>, NodeError> {
        Ok(Box::new(GroupNode))
    }

    fn node_type(&self) -> &str {
        GROUP_NODE_TYPE
    }

    fn metadata(&self) -> NodeTypeInfo {
        NodeTypeInfo {
            description: "Visual container for a set of nodes".to_string(),
            category: "layout".to_string(),
            inputs: vec![],
            outputs: vec![],
        }
    }
}
