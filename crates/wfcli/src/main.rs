// crates/wfcli/src/main.rs

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use wfcore::{snapshots_to_data, ExecutionEvent, NodeEvent, NodeId, NodeSpec, Value, Workflow};
use wfeditor::group::{GroupPlugin, GroupPluginConfig, GroupService};
use wfeditor::{PluginContext, PluginHost, TextGroupRender};
use wfruntime::{FlowRuntime, RuntimeConfig};

#[derive(Parser)]
#[command(name = "wf")]
#[command(about = "Workflow engine CLI", long_about = None)]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Input data as JSON object
        #[arg(short, long)]
        input: Option<String>,

        /// Runtime config JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the execution snapshots as JSON
        #[arg(long)]
        snapshots: bool,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes,

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },

    /// Wrap nodes of a workflow in a new group
    Group {
        #[arg(short, long)]
        file: PathBuf,

        /// Comma separated node ids
        #[arg(short, long, value_delimiter = ',', required = true)]
        nodes: Vec<NodeId>,

        /// Where to write the result (defaults to the input file)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Dissolve a group, keeping its children
    Ungroup {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long)]
        group: NodeId,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the workflow as a tree of groups and nodes
    Tree {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    match cli.command {
        Commands::Run {
            file,
            input,
            config,
            snapshots,
        } => run_workflow(file, input, config, snapshots).await,
        Commands::Validate { file } => validate_workflow(&file),
        Commands::Nodes => list_nodes(),
        Commands::Init { output } => create_example_workflow(&output),
        Commands::Group {
            file,
            nodes,
            output,
        } => group_nodes(&file, &nodes, output.as_deref()),
        Commands::Ungroup {
            file,
            group,
            output,
        } => ungroup_node(&file, group, output.as_deref()),
        Commands::Tree { file } => print_tree(&file),
    }
}

/// Standard nodes plus the group plugin with its default render
fn editor_context() -> Result<PluginContext> {
    let mut context = PluginContext::new();
    wfnodes::register_all(&mut context.nodes);

    let mut host = PluginHost::new(context);
    host.register(&GroupPlugin::new(GroupPluginConfig::new(TextGroupRender)))?;
    Ok(host.into_context())
}

fn load_workflow(file: &Path) -> Result<Workflow> {
    let workflow_json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    serde_json::from_str(&workflow_json).with_context(|| format!("parsing {}", file.display()))
}

fn save_workflow(workflow: &Workflow, file: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(workflow)?;
    std::fs::write(file, json).with_context(|| format!("writing {}", file.display()))
}

fn parse_inputs(input: Option<String>) -> Result<HashMap<String, Value>> {
    let Some(input_str) = input else {
        return Ok(HashMap::new());
    };
    match serde_json::from_str::<serde_json::Value>(&input_str)? {
        serde_json::Value::Object(obj) => Ok(obj
            .into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect()),
        _ => bail!("Input must be a JSON object"),
    }
}

async fn run_workflow(
    file: PathBuf,
    input: Option<String>,
    config: Option<PathBuf>,
    print_snapshots: bool,
) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow = load_workflow(&file)?;
    println!("📋 Workflow: {}", workflow.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Connections: {}", workflow.connections.len());
    println!();

    let inputs = parse_inputs(input)?;
    let runtime_config = match config {
        Some(path) => RuntimeConfig::from_file(&path)?,
        None => RuntimeConfig::default(),
    };
    tracing::debug!(
        max_parallel = runtime_config.max_parallel_nodes,
        event_buffer = runtime_config.event_buffer_size,
        "Runtime configured"
    );

    let context = editor_context()?;
    let runtime = FlowRuntime::with_registry(Arc::new(context.nodes), runtime_config);

    let mut events = runtime.subscribe_events();
    let event_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ExecutionEvent::WorkflowStarted { .. } => println!("▶️  Workflow started"),
                ExecutionEvent::NodeStarted {
                    node_id, node_type, ..
                } => println!("  ⚡ Starting node: {} ({})", node_id, node_type),
                ExecutionEvent::NodeCompleted {
                    node_id,
                    duration_ms,
                    branch,
                    ..
                } => match branch {
                    Some(branch) => println!(
                        "  ✅ Node {} completed in {}ms, branch {}",
                        node_id, duration_ms, branch
                    ),
                    None => println!("  ✅ Node {} completed in {}ms", node_id, duration_ms),
                },
                ExecutionEvent::NodeFailed { node_id, error, .. } => {
                    println!("  ❌ Node {} failed: {}", node_id, error)
                }
                ExecutionEvent::NodeSkipped { node_id, .. } => {
                    println!("  ⏭️  Node {} skipped", node_id)
                }
                ExecutionEvent::NodeEvent { node_id, event, .. } => match event {
                    NodeEvent::Info { message } => println!("     ℹ️  [{}] {}", node_id, message),
                    NodeEvent::Warning { message } => {
                        println!("     ⚠️  [{}] {}", node_id, message)
                    }
                    NodeEvent::Progress { percent, message } => match message {
                        Some(msg) => println!("     📊 [{}] {}% - {}", node_id, percent, msg),
                        None => println!("     📊 [{}] {}%", node_id, percent),
                    },
                },
                ExecutionEvent::WorkflowCompleted {
                    success,
                    duration_ms,
                    ..
                } => {
                    if success {
                        println!("✨ Workflow completed successfully in {}ms", duration_ms);
                    } else {
                        println!("💥 Workflow failed after {}ms", duration_ms);
                    }
                }
            }
        }
    });

    let result = runtime.execute(&workflow, inputs).await;

    // let the listener drain before printing the summary
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    event_task.abort();
    let result = result?;

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", result.execution_id);
    println!(
        "   Completed: {}/{} nodes ({} skipped)",
        result.completed_nodes, result.total_nodes, result.skipped_nodes
    );

    if print_snapshots {
        println!();
        println!("📸 Snapshots:");
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshots_to_data(&result.snapshots))?
        );
    } else if !result.outputs.is_empty() {
        println!();
        println!("📤 Outputs:");
        for snapshot in &result.snapshots {
            if snapshot.outputs.is_empty() {
                continue;
            }
            println!("   Node {}:", snapshot.node_id);
            for (key, value) in &snapshot.outputs {
                println!("     {}: {}", key, value.to_json());
            }
        }
    }

    Ok(())
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    let context = editor_context()?;
    let problems = wfruntime::validate_workflow(&workflow, &context.nodes);

    if !problems.is_empty() {
        for problem in &problems {
            println!("   ❌ {}", problem);
        }
        bail!("{} problem(s) found", problems.len());
    }

    println!("✅ Workflow is valid:");
    println!("   Name: {}", workflow.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Connections: {}", workflow.connections.len());
    Ok(())
}

fn list_nodes() -> Result<()> {
    println!("📦 Available Node Types:");
    println!();

    let context = editor_context()?;
    for node_type in context.nodes.list_node_types() {
        if let Some(metadata) = context.nodes.get_metadata(&node_type) {
            println!("  • {} ({})", node_type, metadata.category);
            println!("    {}", metadata.description);
        } else {
            println!("  • {}", node_type);
        }
    }

    let shortcuts = context.shortcuts.list();
    if !shortcuts.is_empty() {
        println!();
        println!("⌨️  Shortcuts:");
        for shortcut in shortcuts {
            println!("  • {} → {}", shortcut.keybinding, shortcut.command);
        }
    }
    Ok(())
}

fn group_nodes(file: &Path, nodes: &[NodeId], output: Option<&Path>) -> Result<()> {
    let mut workflow = load_workflow(file)?;
    let context = editor_context()?;
    let groups = GroupService::from_registry(&context.configs)?;

    let group_id = groups.create_group(&mut workflow, nodes)?;
    let target = output.unwrap_or(file);
    save_workflow(&workflow, target)?;

    println!("📁 Created group {} with {} nodes", group_id, nodes.len());
    println!("   Saved to {}", target.display());
    Ok(())
}

fn ungroup_node(file: &Path, group: NodeId, output: Option<&Path>) -> Result<()> {
    let mut workflow = load_workflow(file)?;
    let context = editor_context()?;
    let groups = GroupService::from_registry(&context.configs)?;

    let released = groups.ungroup(&mut workflow, group)?;
    let target = output.unwrap_or(file);
    save_workflow(&workflow, target)?;

    println!("📂 Released {} nodes from group {}", released.len(), group);
    println!("   Saved to {}", target.display());
    Ok(())
}

fn print_tree(file: &Path) -> Result<()> {
    let workflow = load_workflow(file)?;
    let context = editor_context()?;
    println!("🌳 {}", workflow.name);
    print!("{}", context.renders.render_workflow(&workflow));
    Ok(())
}

fn create_example_workflow(output: &Path) -> Result<()> {
    let mut workflow = Workflow::new("Example Branching Workflow");
    workflow.description =
        Some("Checks the input flag and logs on the matching branch".to_string());

    let check = workflow.add_node(
        NodeSpec::new("control.condition")
            .with_name("Check Flag")
            .with_config("port", "flag")
            .with_position(100.0, 100.0),
    );
    let on_true = workflow.add_node(
        NodeSpec::new("debug.log")
            .with_name("Flag Set")
            .with_position(300.0, 60.0),
    );
    let on_false = workflow.add_node(
        NodeSpec::new("debug.log")
            .with_name("Flag Unset")
            .with_position(300.0, 140.0),
    );

    workflow.connect_branch(check, "true", "message", on_true, "message");
    workflow.connect_branch(check, "false", "message", on_false, "message");

    let context = editor_context()?;
    GroupService::from_registry(&context.configs)?
        .create_group(&mut workflow, &[on_true, on_false])?;

    save_workflow(&workflow, output)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!(
        "  wf run --file {} --input '{{\"flag\": true, \"message\": \"hello\"}}' --snapshots",
        output.display()
    );

    Ok(())
}
