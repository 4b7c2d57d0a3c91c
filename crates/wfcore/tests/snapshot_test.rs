use wfcore::{snapshots_to_data, NodeId, Snapshot, SnapshotData, Value};

#[test]
fn test_empty_sequence_yields_empty() {
    let snapshots: Vec<Snapshot> = Vec::new();
    assert!(snapshots_to_data(&snapshots).is_empty());
}

#[test]
fn test_branch_kept_when_present() {
    let node_id = NodeId::new_v4();
    let snapshots = vec![Snapshot::new(node_id)
        .with_output("x", 1.0)
        .with_branch("true")];

    let data = snapshots_to_data(&snapshots);

    assert_eq!(
        data,
        vec![SnapshotData::new(node_id)
            .with_output("x", 1.0)
            .with_branch("true")]
    );
}

#[test]
fn test_branch_key_absent_when_missing() {
    let node_id = NodeId::new_v4();
    let snapshots = vec![Snapshot::new(node_id)];

    let data = snapshots_to_data(&snapshots);
    assert_eq!(data[0].branch, None);

    let json = serde_json::to_value(&data[0]).unwrap();
    let obj = json.as_object().unwrap();
    assert!(!obj.contains_key("branch"), "branch key must be omitted, not null");
    assert!(obj.contains_key("node_id"));
    assert!(obj.contains_key("inputs"));
    assert!(obj.contains_key("outputs"));
    assert!(obj.contains_key("data"));
    assert!(!obj.contains_key("id"));
    assert!(!obj.contains_key("started_at"));
}

#[test]
fn test_empty_branch_is_treated_as_absent() {
    let snapshots = vec![Snapshot::new(NodeId::new_v4()).with_branch("")];
    assert_eq!(snapshots_to_data(&snapshots)[0].branch, None);
}

#[test]
fn test_length_and_order_preserved() {
    let ids: Vec<NodeId> = (0..5).map(|_| NodeId::new_v4()).collect();
    let snapshots: Vec<Snapshot> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| Snapshot::new(*id).with_output("index", i as i64))
        .collect();

    let data = snapshots_to_data(&snapshots);

    assert_eq!(data.len(), snapshots.len());
    for (i, (normalized, id)) in data.iter().zip(&ids).enumerate() {
        assert_eq!(normalized.node_id, *id);
        assert_eq!(normalized.outputs.get("index"), Some(&Value::Number(i as f64)));
    }
}

#[test]
fn test_payloads_copied_verbatim_and_input_untouched() {
    let snapshot = Snapshot::new(NodeId::new_v4())
        .with_input("in", "hello")
        .with_output("out", serde_json::json!({"nested": [1, 2, 3]}))
        .with_data("condition", true);
    let snapshots = vec![snapshot.clone()];

    let data = snapshots_to_data(&snapshots);

    assert_eq!(snapshots[0], snapshot);
    assert_eq!(data[0].inputs, snapshot.inputs);
    assert_eq!(data[0].outputs, snapshot.outputs);
    assert_eq!(data[0].data, snapshot.data);
}

#[test]
fn test_normalizing_twice_is_stable() {
    let snapshots = vec![
        Snapshot::new(NodeId::new_v4()).with_branch("false"),
        Snapshot::new(NodeId::new_v4()).with_output("y", 2.0),
    ];

    let once = snapshots_to_data(&snapshots);
    let twice = snapshots_to_data(&once);

    assert_eq!(once, twice);
}

#[test]
fn test_normalized_json_shape() {
    let node_id = NodeId::new_v4();
    let data = snapshots_to_data(&[Snapshot::new(node_id).with_output("x", 1.0)]);

    let json = serde_json::to_value(&data).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "node_id": node_id,
            "inputs": {},
            "outputs": {"x": {"type": "Number", "value": 1.0}},
            "data": {},
        }])
    );
}
