//! Execution snapshots
//!
//! The executor records one [`Snapshot`] per node it runs. [`SnapshotData`]
//! is the comparison-friendly view of a snapshot with the bookkeeping fields
//! (`id`, timing) stripped, which is what tests assert against.

use crate::{NodeId, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub type SnapshotId = Uuid;

/// Record of a single node execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub node_id: NodeId,
    pub inputs: HashMap<String, Value>,
    pub outputs: HashMap<String, Value>,
    pub data: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl Snapshot {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            node_id,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            data: HashMap::new(),
            branch: None,
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Snapshot without its bookkeeping fields.
///
/// `branch` is only present when the source snapshot reported a non-empty
/// branch; it is omitted from the serialized form otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotData {
    pub node_id: NodeId,
    pub inputs: HashMap<String, Value>,
    pub outputs: HashMap<String, Value>,
    pub data: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl SnapshotData {
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
            data: HashMap::new(),
            branch: None,
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.outputs.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Read access shared by full and normalized snapshots, so that a
/// normalized sequence can be normalized again.
pub trait SnapshotView {
    fn node_id(&self) -> NodeId;
    fn inputs(&self) -> &HashMap<String, Value>;
    fn outputs(&self) -> &HashMap<String, Value>;
    fn data(&self) -> &HashMap<String, Value>;
    fn branch(&self) -> Option<&str>;
}

impl SnapshotView for Snapshot {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn inputs(&self) -> &HashMap<String, Value> {
        &self.inputs
    }

    fn outputs(&self) -> &HashMap<String, Value> {
        &self.outputs
    }

    fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

impl SnapshotView for SnapshotData {
    fn node_id(&self) -> NodeId {
        self.node_id
    }

    fn inputs(&self) -> &HashMap<String, Value> {
        &self.inputs
    }

    fn outputs(&self) -> &HashMap<String, Value> {
        &self.outputs
    }

    fn data(&self) -> &HashMap<String, Value> {
        &self.data
    }

    fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

impl<S: SnapshotView> From<&S> for SnapshotData {
    fn from(snapshot: &S) -> Self {
        Self {
            node_id: snapshot.node_id(),
            inputs: snapshot.inputs().clone(),
            outputs: snapshot.outputs().clone(),
            data: snapshot.data().clone(),
            // an empty branch name counts as no branch
            branch: snapshot
                .branch()
                .filter(|branch| !branch.is_empty())
                .map(str::to_owned),
        }
    }
}

/// Strip bookkeeping fields from a sequence of snapshots, preserving order.
pub fn snapshots_to_data<S: SnapshotView>(snapshots: &[S]) -> Vec<SnapshotData> {
    snapshots.iter().map(SnapshotData::from).collect()
}
