use std::sync::Arc;
use wfcore::{NodeSpec, Workflow};
use wfeditor::{
    ConfigKey, ConfigRegistry, NodeRender, PluginError, RenderRegistry, Shortcut,
    ShortcutRegistry, TextGroupRender,
};

const LIMIT: ConfigKey<u32> = ConfigKey::new("test.limit");
const LIMIT_AS_TEXT: ConfigKey<String> = ConfigKey::new("test.limit");

#[test]
fn test_config_registry_is_typed_and_write_once() {
    let mut configs = ConfigRegistry::new();
    assert!(configs.get(&LIMIT).is_none());

    configs.insert(&LIMIT, 7).unwrap();

    assert_eq!(configs.get(&LIMIT).as_deref(), Some(&7));
    assert!(configs.get(&LIMIT_AS_TEXT).is_none());
    assert_eq!(
        configs.insert(&LIMIT, 8).unwrap_err(),
        PluginError::DuplicateConfig("test.limit")
    );
}

#[test]
fn test_shortcut_registry() {
    let mut shortcuts = ShortcutRegistry::new();
    shortcuts
        .register(Shortcut::new("Mod+K", "palette.open"))
        .unwrap();

    assert_eq!(shortcuts.command_for("mod+k"), Some("palette.open"));
    assert_eq!(
        shortcuts.register(Shortcut::new("mod+k", "other")),
        Err(PluginError::DuplicateShortcut("mod+k".to_string()))
    );
    assert_eq!(
        shortcuts.list(),
        vec![Shortcut::new("mod+k", "palette.open")]
    );
}

#[test]
fn test_render_workflow_tree() {
    let mut workflow = Workflow::new("tree");
    let group = workflow.add_node(NodeSpec::new("group").with_config("title", "Inputs"));
    let child = workflow.add_node(NodeSpec::new("debug.log").with_name("Log").with_parent(group));
    let loose = workflow.add_node(NodeSpec::new("time.delay"));

    let mut renders = RenderRegistry::new();
    renders
        .register("group", Arc::new(TextGroupRender))
        .unwrap();

    let tree = renders.render_workflow(&workflow);

    assert_eq!(
        tree,
        format!(
            "[Inputs] 1 nodes ({})\n  debug.log Log ({})\ntime.delay ({})\n",
            group, child, loose
        )
    );
}

#[test]
fn test_closure_render_and_duplicates() {
    let upper = |node: &NodeSpec, _children: &[&NodeSpec]| node.node_type.to_uppercase();
    let mut renders = RenderRegistry::new();
    renders.register("debug.log", Arc::new(upper)).unwrap();

    let node = NodeSpec::new("debug.log");
    assert_eq!(
        renders.get("debug.log").unwrap().render(&node, &[]),
        "DEBUG.LOG"
    );
    assert_eq!(
        renders
            .register("debug.log", Arc::new(TextGroupRender))
            .unwrap_err(),
        PluginError::DuplicateRender("debug.log".to_string())
    );
}

#[test]
fn test_render_survives_parent_cycle() {
    let mut workflow = Workflow::new("cycle");
    let a = NodeSpec::new("group");
    let b = NodeSpec::new("group").with_parent(a.id);
    let a = a.with_parent(b.id);
    workflow.add_node(a);
    workflow.add_node(b);

    // neither node is reachable from the top level
    assert_eq!(RenderRegistry::new().render_workflow(&workflow), "");
}
