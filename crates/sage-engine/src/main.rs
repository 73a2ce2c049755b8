//! Sage - hybrid reasoning over multiple-choice problems
//!
//! Prints one JSON record per problem on stdout; logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sage_engine::{Config, PromptRouter, Reasoner, TopicRouter};
use sage_shared::{optimize_weights, PerformanceTable, Problem, WeightsArtifact};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sage")]
#[command(about = "Sage - symbolic and language-model reasoning for multiple-choice problems", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve every problem in a JSON array of problem rows
    Solve {
        /// Path to the problems file
        problems: PathBuf,

        /// Topic for every problem, overriding per-row labels
        #[arg(long)]
        topic: Option<String>,

        /// Skip the language-model path
        #[arg(long)]
        symbolic_only: bool,

        /// Config file (default: /etc/sage/config.toml, then ./sage.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Turn a per-topic accuracy table into normalised trust weights
    Weights {
        /// Path to the performance table (topic -> strategy -> accuracy)
        performance: PathBuf,

        /// Write the artifact here instead of printing it
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List solver topics and prompt templates
    Topics,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Solve {
            problems,
            topic,
            symbolic_only,
            config,
        } => solve(&problems, topic.as_deref(), symbolic_only, config.as_deref()),
        Commands::Weights {
            performance,
            output,
        } => weights(&performance, output.as_deref()),
        Commands::Topics => {
            topics();
            Ok(())
        }
    }
}

fn solve(path: &Path, topic: Option<&str>, symbolic_only: bool, config: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read problems from {}", path.display()))?;
    let problems: Vec<Problem> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of problem rows", path.display()))?;

    let config = Config::load(config);
    let reasoner = Reasoner::from_config(&config, symbolic_only);
    let started = Utc::now();
    info!("Sage v{} solving {} problems", env!("CARGO_PKG_VERSION"), problems.len());

    let mut unanswered = 0;
    for problem in &problems {
        let record = reasoner.reason(problem, topic);
        if record.is_empty() {
            unanswered += 1;
        }
        println!("{}", serde_json::to_string(&record)?);
    }

    if unanswered > 0 {
        warn!("{} problems got no answer from either path", unanswered);
    }
    info!("Finished in {} ms", (Utc::now() - started).num_milliseconds());
    Ok(())
}

fn weights(path: &Path, output: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read performance table from {}", path.display()))?;
    let table: PerformanceTable = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a topic -> strategy -> accuracy table", path.display()))?;

    let artifact = WeightsArtifact::new(optimize_weights(&table)?);
    info!(
        "Optimized weights for {} topics at {}",
        artifact.weights.len(),
        artifact.generated_at.to_rfc3339()
    );

    match output {
        Some(out) => artifact.save(out)?,
        None => println!("{}", serde_json::to_string_pretty(&artifact)?),
    }
    Ok(())
}

fn topics() {
    println!("Solver topics:");
    for topic in TopicRouter::with_defaults().topics() {
        println!("  {}", topic);
    }
    println!("Prompt templates:");
    for key in PromptRouter::new().keys() {
        println!("  {}", key);
    }
}
