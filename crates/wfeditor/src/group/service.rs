use super::{GroupPluginConfig, GROUP_CREATE_COMMAND, GROUP_PLUGIN_OPTIONS, GROUP_UNGROUP_COMMAND};
use crate::{ConfigRegistry, GroupError};
use std::collections::HashSet;
use std::sync::Arc;
use wfcore::{NodeId, NodeSpec, Position, Workflow};
use wfnodes::GROUP_NODE_TYPE;

/// Space left between a new group's edge and its outermost child
pub const GROUP_PADDING: f32 = 20.0;

const DEFAULT_GROUP_TITLE: &str = "Group";

/// Group and ungroup nodes of a workflow according to the registered options
pub struct GroupService {
    config: Arc<GroupPluginConfig>,
}

impl GroupService {
    pub fn new(config: Arc<GroupPluginConfig>) -> Self {
        Self { config }
    }

    /// Build from the options the group plugin stored at registration
    pub fn from_registry(configs: &ConfigRegistry) -> Result<Self, GroupError> {
        configs
            .get(&GROUP_PLUGIN_OPTIONS)
            .map(Self::new)
            .ok_or(GroupError::NotConfigured)
    }

    pub fn is_group(node: &NodeSpec) -> bool {
        node.node_type == GROUP_NODE_TYPE
    }

    pub fn children<'a>(workflow: &'a Workflow, group_id: NodeId) -> Vec<&'a NodeSpec> {
        workflow.children_of(group_id).collect()
    }

    /// Wrap `node_ids` in a new group node and return its id.
    ///
    /// The selection must be non-empty, free of duplicates, and share one
    /// container. The new group joins that container. The configured
    /// initialisation hook may reshape the group node, but its id, type and
    /// container are kept.
    pub fn create_group(
        &self,
        workflow: &mut Workflow,
        node_ids: &[NodeId],
    ) -> Result<NodeId, GroupError> {
        if node_ids.is_empty() {
            return Err(GroupError::EmptySelection);
        }

        let mut seen = HashSet::new();
        let mut children = Vec::with_capacity(node_ids.len());
        for id in node_ids {
            if !seen.insert(*id) {
                return Err(GroupError::DuplicateSelection(*id));
            }
            let node = workflow
                .find_node(*id)
                .ok_or(GroupError::NodeNotFound(*id))?;
            children.push(node.clone());
        }

        let parent = children[0].parent;
        if children.iter().any(|c| c.parent != parent) {
            return Err(GroupError::MixedParents);
        }

        let mut proposed = NodeSpec::new(GROUP_NODE_TYPE)
            .with_name(DEFAULT_GROUP_TITLE)
            .with_config("title", DEFAULT_GROUP_TITLE);
        proposed.parent = parent;
        proposed.position = bounding_origin(&children);

        let group_id = proposed.id;
        let mut group = match &self.config.init_group_json {
            Some(init) => init(proposed, &children),
            None => proposed,
        };
        if group.id != group_id {
            tracing::warn!("Group init hook changed node id; keeping {}", group_id);
        }
        group.id = group_id;
        group.node_type = GROUP_NODE_TYPE.to_string();
        group.parent = parent;

        // keep containers ahead of their children in node order
        let insert_at = workflow
            .nodes
            .iter()
            .position(|n| seen.contains(&n.id))
            .unwrap_or(workflow.nodes.len());
        workflow.nodes.insert(insert_at, group);

        for node in workflow.nodes.iter_mut().filter(|n| seen.contains(&n.id)) {
            node.parent = Some(group_id);
        }

        tracing::info!("Grouped {} nodes into {}", node_ids.len(), group_id);
        Ok(group_id)
    }

    /// Dissolve a group, moving its children to the group's own container.
    /// Returns the ids of the released children.
    pub fn ungroup(
        &self,
        workflow: &mut Workflow,
        group_id: NodeId,
    ) -> Result<Vec<NodeId>, GroupError> {
        let group = workflow
            .find_node(group_id)
            .ok_or(GroupError::NodeNotFound(group_id))?;
        if !Self::is_group(group) {
            return Err(GroupError::NotAGroup(group_id));
        }
        let parent = group.parent;

        let mut released = Vec::new();
        for node in workflow
            .nodes
            .iter_mut()
            .filter(|n| n.parent == Some(group_id))
        {
            node.parent = parent;
            released.push(node.id);
        }
        workflow.remove_node(group_id);

        tracing::info!("Ungrouped {} nodes from {}", released.len(), group_id);
        Ok(released)
    }

    /// Run a shortcut command against the current selection.
    ///
    /// Returns the new selection: the group for `group.create`, the released
    /// children for `group.ungroup`. Unknown commands return `Ok(None)`.
    pub fn run_command(
        &self,
        command: &str,
        workflow: &mut Workflow,
        selection: &[NodeId],
    ) -> Result<Option<Vec<NodeId>>, GroupError> {
        match command {
            GROUP_CREATE_COMMAND => Ok(Some(vec![self.create_group(workflow, selection)?])),
            GROUP_UNGROUP_COMMAND => {
                // the whole selection is checked before any group is dissolved
                let mut seen = HashSet::new();
                for id in selection {
                    if !seen.insert(*id) {
                        return Err(GroupError::DuplicateSelection(*id));
                    }
                    let node = workflow.find_node(*id).ok_or(GroupError::NodeNotFound(*id))?;
                    if !Self::is_group(node) {
                        return Err(GroupError::NotAGroup(*id));
                    }
                }

                let mut released = Vec::new();
                for id in selection {
                    released.extend(self.ungroup(workflow, *id)?);
                }
                Ok(Some(released))
            }
            _ => Ok(None),
        }
    }
}

/// Top-left corner of the children's bounding box, pushed out by the padding.
/// `None` when no child has a position.
fn bounding_origin(children: &[NodeSpec]) -> Option<Position> {
    children
        .iter()
        .filter_map(|c| c.position)
        .fold(None, |acc: Option<Position>, p| {
            Some(match acc {
                Some(a) => Position {
                    x: a.x.min(p.x),
                    y: a.y.min(p.y),
                },
                None => p,
            })
        })
        .map(|p| Position {
            x: p.x - GROUP_PADDING,
            y: p.y - GROUP_PADDING,
        })
}
