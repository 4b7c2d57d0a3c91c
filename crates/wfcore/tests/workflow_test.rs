use std::collections::HashMap;
use wfcore::{Connection, NodeSpec, Value, Workflow};

#[test]
fn test_remove_node_drops_connections() {
    let mut workflow = Workflow::new("remove");
    let a = workflow.add_node(NodeSpec::new("debug.log"));
    let b = workflow.add_node(NodeSpec::new("debug.log"));
    let c = workflow.add_node(NodeSpec::new("debug.log"));
    workflow.connect(a, "message", b, "message");
    workflow.connect(b, "message", c, "message");

    let removed = workflow.remove_node(b).unwrap();

    assert_eq!(removed.id, b);
    assert_eq!(workflow.nodes.len(), 2);
    assert!(workflow.connections.is_empty());
    assert!(workflow.remove_node(b).is_none());
}

#[test]
fn test_children_of_follows_parent() {
    let mut workflow = Workflow::new("children");
    let group = workflow.add_node(NodeSpec::new("group"));
    let inside = workflow.add_node(NodeSpec::new("debug.log").with_parent(group));
    workflow.add_node(NodeSpec::new("debug.log"));

    let children: Vec<_> = workflow.children_of(group).map(|n| n.id).collect();
    assert_eq!(children, vec![inside]);
}

#[test]
fn test_branch_connection_activity() {
    let mut workflow = Workflow::new("branch");
    let a = workflow.add_node(NodeSpec::new("control.condition"));
    let b = workflow.add_node(NodeSpec::new("debug.log"));
    workflow.connect_branch(a, "true", "value", b, "message");
    workflow.connect(a, "value", b, "other");

    let tagged: &Connection = &workflow.connections[0];
    assert!(tagged.is_active(Some("true")));
    assert!(!tagged.is_active(Some("false")));
    assert!(!tagged.is_active(None));
    assert!(workflow.connections[1].is_active(None));
}

#[test]
fn test_workflow_json_defaults() {
    let json = serde_json::json!({
        "id": uuid::Uuid::new_v4(),
        "name": "minimal",
        "nodes": [{"id": uuid::Uuid::new_v4(), "node_type": "debug.log"}],
    });

    let workflow: Workflow = serde_json::from_value(json).unwrap();

    assert!(workflow.connections.is_empty());
    assert_eq!(workflow.settings.max_parallel_nodes, 10);
    assert_eq!(workflow.nodes[0].parent, None);
}

#[test]
fn test_value_json_conversion() {
    let json = serde_json::json!({"a": [1, "two", null], "b": true});
    let value = Value::from_json(json.clone());

    let mut expected = HashMap::new();
    expected.insert(
        "a".to_string(),
        Value::Array(vec![
            Value::Number(1.0),
            Value::String("two".to_string()),
            Value::Null,
        ]),
    );
    expected.insert("b".to_string(), Value::Bool(true));
    assert_eq!(value, Value::Object(expected));
    assert_eq!(value.to_json(), serde_json::json!({"a": [1.0, "two", null], "b": true}));
}

#[test]
fn test_truthiness() {
    assert!(!Value::Null.is_truthy());
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::String(String::new()).is_truthy());
    assert!(Value::String("x".to_string()).is_truthy());
    assert!(Value::Array(vec![]).is_truthy());
    assert!(!Value::Json(serde_json::json!(false)).is_truthy());
}
