use crate::PluginError;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::Arc;
use wfcore::{NodeId, NodeSpec, Workflow};

/// Produces the visual form of one node.
///
/// Kept independent of any UI toolkit: a render turns a node and its direct
/// children into a view description, here a single line of text.
pub trait NodeRender: Send + Sync {
    fn render(&self, node: &NodeSpec, children: &[&NodeSpec]) -> String;
}

impl<F> NodeRender for F
where
    F: Fn(&NodeSpec, &[&NodeSpec]) -> String + Send + Sync,
{
    fn render(&self, node: &NodeSpec, children: &[&NodeSpec]) -> String {
        self(node, children)
    }
}

/// Default render for group containers
pub struct TextGroupRender;

impl NodeRender for TextGroupRender {
    fn render(&self, node: &NodeSpec, children: &[&NodeSpec]) -> String {
        let title = node
            .config
            .get("title")
            .and_then(|v| v.as_str())
            .or(node.name.as_deref())
            .unwrap_or("Group");
        format!("[{}] {} nodes ({})", title, children.len(), node.id)
    }
}

/// Renders keyed by node type
#[derive(Default)]
pub struct RenderRegistry {
    renders: HashMap<String, Arc<dyn NodeRender>>,
}

impl RenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        node_type: impl Into<String>,
        render: Arc<dyn NodeRender>,
    ) -> Result<(), PluginError> {
        let node_type = node_type.into();
        if self.renders.contains_key(&node_type) {
            return Err(PluginError::DuplicateRender(node_type));
        }
        tracing::info!("Registering render for node type: {}", node_type);
        self.renders.insert(node_type, render);
        Ok(())
    }

    pub fn get(&self, node_type: &str) -> Option<&Arc<dyn NodeRender>> {
        self.renders.get(node_type)
    }

    /// Render a workflow as an indented tree following group membership.
    /// Nodes without a registered render get a plain `type name (id)` line.
    pub fn render_workflow(&self, workflow: &Workflow) -> String {
        let mut out = String::new();
        let mut visited = HashSet::new();
        self.render_level(workflow, None, 0, &mut visited, &mut out);
        out
    }

    fn render_level(
        &self,
        workflow: &Workflow,
        parent: Option<NodeId>,
        depth: usize,
        visited: &mut HashSet<NodeId>,
        out: &mut String,
    ) {
        for node in workflow.nodes.iter().filter(|n| n.parent == parent) {
            // a parent cycle would otherwise recurse forever
            if !visited.insert(node.id) {
                continue;
            }
            let children: Vec<&NodeSpec> = workflow.children_of(node.id).collect();
            let line = match self.renders.get(&node.node_type) {
                Some(render) => render.render(node, &children),
                None => default_line(node),
            };
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), line);
            self.render_level(workflow, Some(node.id), depth + 1, visited, out);
        }
    }
}

fn default_line(node: &NodeSpec) -> String {
    match &node.name {
        Some(name) => format!("{} {} ({})", node.node_type, name, node.id),
        None => format!("{} ({})", node.node_type, node.id),
    }
}
