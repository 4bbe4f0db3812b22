use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sqlsandbox::error::Error;
use sqlsandbox::{JsonLinesSink, Orchestrator, RepositoryInput, ValidatorConfig};

/// Validate harvested SELECT statements against synthetic per-repository schemas
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// JSON array of repositories (tables, statements, CREATE statements)
    #[arg(long)]
    input: PathBuf,

    /// Directory receiving the JSON-lines record streams
    #[arg(long = "output-dir", default_value = "validation_output")]
    output_dir: PathBuf,

    /// Config file (defaults to <config_dir>/sqlsandbox/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log per-statement outcomes
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = ValidatorConfig::load(cli.config.as_deref()).context("loading configuration")?;

    let data = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let repos: Vec<RepositoryInput> =
        serde_json::from_str(&data).with_context(|| format!("parsing {}", cli.input.display()))?;

    let sink = JsonLinesSink::create(&cli.output_dir)
        .with_context(|| format!("opening output directory {}", cli.output_dir.display()))?;

    let started = Utc::now();
    let mut orchestrator = Orchestrator::new(config, sink);
    let mut sandbox_failures = 0;

    for repo in repos.iter().filter(|r| !r.statements.is_empty()) {
        match orchestrator.process_repository(repo) {
            Ok(_) => {}
            Err(e @ Error::Sink(_)) => {
                return Err(e)
                    .with_context(|| format!("writing records for repository {}", repo.repo_id));
            }
            Err(e) => {
                error!(repo_id = repo.repo_id, error = %e, "repository skipped");
                sandbox_failures += 1;
            }
        }
    }
    let finished = Utc::now();

    let totals = orchestrator.totals();
    info!(
        repositories = totals.repositories,
        skipped = repos.len() - totals.repositories,
        "run complete"
    );
    println!("Run started:  {}", started.to_rfc3339());
    println!("Run finished: {}", finished.to_rfc3339());
    println!(
        "Elapsed:      {:.2}s",
        (finished - started).num_milliseconds() as f64 / 1000.0
    );
    println!("Repositories: {}", totals.repositories);
    if sandbox_failures > 0 {
        println!("Sandbox failures: {sandbox_failures}");
    }
    println!(
        "Tables:       {} materialized, {} failed",
        totals.tables_materialized, totals.tables_failed
    );
    println!(
        "Queries:      {} succeeded, {} failed ({} total)",
        totals.queries_succeeded,
        totals.queries_failed,
        totals.queries()
    );
    println!("Records written to {}", orchestrator.sink().dir().display());

    Ok(())
}
