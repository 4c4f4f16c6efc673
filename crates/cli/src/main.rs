//! Blockflow command line: run workflow documents against the standard
//! block library.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use blockflow_blocks::standard_registry;
use blockflow_engine::{Job, SkipPolicy};
use blockflow_types::JobDefinition;

#[derive(Parser)]
#[command(name = "blockflow", version, about = "Declarative workflow runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workflow document (YAML or JSON)
    Run {
        /// Path to the workflow document
        #[arg(short, long)]
        file: PathBuf,
        /// Extra permission tags to grant the job
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Keep executing later steps after a failure
        #[arg(long)]
        keep_going: bool,
        /// Print the step report even when the run succeeds
        #[arg(long)]
        report: bool,
    },
    /// List the available blocks
    Blocks,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match Cli::parse().command {
        Commands::Run { file, tags, keep_going, report } => run(&file, tags, keep_going, report).await,
        Commands::Blocks => list_blocks(),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_definition(file: &Path) -> Result<JobDefinition> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let is_yaml = matches!(
        file.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    if is_yaml {
        serde_yaml::from_str(&raw).with_context(|| format!("invalid workflow document {}", file.display()))
    } else {
        serde_json::from_str(&raw).with_context(|| format!("invalid workflow document {}", file.display()))
    }
}

async fn run(file: &Path, tags: Vec<String>, keep_going: bool, report: bool) -> Result<()> {
    let definition = load_definition(file)?;
    let registry = standard_registry().context("failed to build the standard block registry")?;
    let mut job = Job::from_definition(definition, Arc::new(registry));
    job.tags.extend(tags);
    if keep_going {
        job.skip_policy = SkipPolicy::Continue;
    }

    let success = job.run().await.context("workflow rejected")?;
    if report || !success {
        println!("{}", serde_json::to_string_pretty(&job.report())?);
    }
    if !success {
        if let Some(step) = job.failed_step() {
            tracing::error!(step = %step.id, status = step.status.name(), "job failed");
        }
        std::process::exit(1);
    }
    Ok(())
}

fn list_blocks() -> Result<()> {
    let registry = standard_registry().context("failed to build the standard block registry")?;
    for block in registry.iter() {
        let descriptor = &block.descriptor;
        let mut line = descriptor.display_name();
        if !descriptor.required_params.is_empty() {
            line.push_str(&format!("  required: {}", descriptor.required_params.join(", ")));
        }
        if !descriptor.optional_params.is_empty() {
            line.push_str(&format!("  optional: {}", descriptor.optional_params.join(", ")));
        }
        if descriptor.variadic {
            line.push_str("  (variadic)");
        }
        println!("{line}");
    }
    Ok(())
}
