//! `pixelflow` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    : start the API server.
//! - `validate` : validate and schedule a workflow JSON file.
//! - `run`      : execute a workflow file against a local image.
//! - `operators`: print the registered operators as JSON.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use engine::{OperatorRegistry, WorkflowExecutor, WorkflowSubmission};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pixelflow",
    about = "Node-graph image processing workflow engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, env = "PIXELFLOW_BIND", default_value = "0.0.0.0:5000")]
        bind: String,
        /// Maximum request body size in bytes.
        #[arg(long, env = "PIXELFLOW_MAX_BODY_BYTES", default_value_t = api::ServerConfig::default().max_body_bytes)]
        max_body_bytes: usize,
    },
    /// Validate a workflow definition JSON file and print its execution order.
    Validate {
        /// Path to the workflow JSON file.
        path: PathBuf,
    },
    /// Execute a workflow definition against an image file.
    Run {
        /// Path to the workflow JSON file.
        path: PathBuf,
        /// Root input image.
        #[arg(long, short)]
        input: PathBuf,
        /// Where to write the final image (format chosen by extension).
        #[arg(long, short, default_value = "output.png")]
        output: PathBuf,
    },
    /// Print every registered operator descriptor as JSON.
    Operators,
}

/// Validate and schedule the workflow at `path`, returning its execution order.
fn validate_workflow(path: &Path, registry: &OperatorRegistry) -> anyhow::Result<Vec<String>> {
    let workflow = read_workflow(path)?;
    engine::validate(&workflow, registry)
        .and_then(|graph| engine::schedule(&graph))
        .map_err(|e| anyhow::anyhow!("❌ Validation failed ({} stage): {e}", e.stage()))
}

fn read_workflow(path: &Path) -> anyhow::Result<WorkflowSubmission> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid workflow JSON in {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let registry = OperatorRegistry::global()?;

    match cli.command {
        Command::Serve { bind, max_body_bytes } => {
            info!("Starting API server on {bind}");
            let config = api::ServerConfig { bind, max_body_bytes };
            api::serve(config, registry).await?;
        }
        Command::Validate { path } => {
            let order = validate_workflow(&path, registry)?;
            println!("✅ Workflow is valid. Execution order: {order:?}");
        }
        Command::Run { path, input, output } => {
            let workflow = read_workflow(&path)?;
            let root = image::open(&input)
                .with_context(|| format!("cannot open input image {}", input.display()))?
                .to_rgb8();

            let result = tokio::task::spawn_blocking(move || {
                WorkflowExecutor::new(registry).run(&workflow, Arc::new(root))
            })
            .await??;

            result
                .image
                .save(&output)
                .with_context(|| format!("cannot write {}", output.display()))?;
            info!(sink = %result.node_id, "wrote {}", output.display());
        }
        Command::Operators => {
            println!("{}", serde_json::to_string_pretty(&registry.list())?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_workflow(name: &str, body: serde_json::Value) -> PathBuf {
        let path = std::env::temp_dir().join(format!("pixelflow-{}-{name}.json", std::process::id()));
        std::fs::write(&path, body.to_string()).unwrap();
        path
    }

    #[test]
    fn validate_returns_the_execution_order() {
        let path = write_workflow(
            "valid",
            json!({
                "nodes": [
                    { "id": "b", "type": "edge_detection" },
                    { "id": "a", "type": "image_filter" }
                ],
                "edges": [ { "source": "a", "target": "b" } ]
            }),
        );
        let order = validate_workflow(&path, OperatorRegistry::global().unwrap()).unwrap();
        assert_eq!(order, vec!["a".to_string(), "b".to_string()]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn validate_failure_is_an_error_not_an_exit() {
        let path = write_workflow(
            "cycle",
            json!({
                "nodes": [
                    { "id": "a", "type": "image_filter" },
                    { "id": "b", "type": "image_filter" }
                ],
                "edges": [ { "source": "a", "target": "b" }, { "source": "b", "target": "a" } ]
            }),
        );
        let err = validate_workflow(&path, OperatorRegistry::global().unwrap()).unwrap_err();
        assert!(err.to_string().contains("scheduling stage"), "{err}");
        std::fs::remove_file(path).ok();
    }
}
