use crate::NodeRegistry;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use std::collections::{HashMap, HashSet};
use wfcore::{NodeId, Workflow, WorkflowError};

/// Static checks run before execution or after an editor change.
///
/// Returns every problem found rather than stopping at the first one.
pub fn validate_workflow(workflow: &Workflow, registry: &NodeRegistry) -> Vec<WorkflowError> {
    let mut problems = Vec::new();
    let mut graph = DiGraph::<NodeId, ()>::new();
    let mut node_to_index = HashMap::new();

    for node in &workflow.nodes {
        if node_to_index.contains_key(&node.id) {
            problems.push(WorkflowError::DuplicateNode(node.id));
            continue;
        }
        if !registry.contains(&node.node_type) {
            problems.push(WorkflowError::UnknownNodeType(node.node_type.clone()));
        }
        node_to_index.insert(node.id, graph.add_node(node.id));
    }

    problems.extend(check_parents(workflow));

    for conn in &workflow.connections {
        match (
            node_to_index.get(&conn.from_node),
            node_to_index.get(&conn.to_node),
        ) {
            (Some(from), Some(to)) => {
                graph.add_edge(*from, *to, ());
            }
            _ => problems.push(WorkflowError::InvalidConnection {
                from: conn.from_node,
                to: conn.to_node,
            }),
        }
    }

    if is_cyclic_directed(&graph) {
        problems.push(WorkflowError::CyclicDependency);
    }

    problems
}

/// Every parent must exist and the containment chains must end at the top level.
/// A cycle is reported once, at its first node in workflow order.
fn check_parents(workflow: &Workflow) -> Vec<WorkflowError> {
    let parents: HashMap<NodeId, Option<NodeId>> =
        workflow.nodes.iter().map(|n| (n.id, n.parent)).collect();
    let mut problems = Vec::new();
    let mut cyclic = HashSet::new();

    for node in &workflow.nodes {
        let Some(parent) = node.parent else {
            continue;
        };
        if !parents.contains_key(&parent) {
            problems.push(WorkflowError::MissingParent {
                node: node.id,
                parent,
            });
            continue;
        }

        // walk up until the chain leaves the workflow, ends, or repeats
        let mut chain = vec![node.id];
        let mut current = parent;
        loop {
            if let Some(start) = chain.iter().position(|id| *id == current) {
                if chain[start..].iter().all(|id| cyclic.insert(*id)) {
                    problems.push(WorkflowError::ParentCycle(current));
                }
                break;
            }
            if cyclic.contains(&current) {
                break;
            }
            chain.push(current);
            match parents.get(&current) {
                Some(Some(next)) => current = *next,
                _ => break,
            }
        }
    }

    problems
}
