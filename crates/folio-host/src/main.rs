//! folio-host entry point.
//!
//! Spawns the worker, lists its tools, runs the quality check and the
//! scenario comparison over a positions file, prints both and (optionally)
//! writes a run report.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use folio_config::{load_layered_yaml, report_unused_keys, UnusedKeyPolicy};
use folio_host::artifacts::{write_run_report, WriteRunReportArgs};
use folio_host::payload::load_positions;
use folio_host::report::{format_quality_summary, quality_error_payload, summarize_scenarios};
use folio_host::scenario_args::parse_scenario_specs;
use folio_host::WorkerProcess;
use serde_json::Value;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folio-host")]
#[command(about = "Portfolio analytics controller", long_about = None)]
struct Cli {
    /// Positions JSON file: {"rows": [...], "price_map": {...}} or a bare row array
    #[arg(long)]
    positions: PathBuf,

    /// Scenario price adjustment, e.g. -5%, +5% (percent) or 2 (absolute). Repeatable.
    #[arg(short = 's', long = "scenario", allow_hyphen_values = true)]
    scenarios: Vec<String>,

    /// Layered config paths in merge order
    #[arg(long = "config")]
    config_paths: Vec<String>,

    /// Worker executable (overrides host.worker_command)
    #[arg(long)]
    worker: Option<String>,

    /// Write exports/<run_id>/report.json (default)
    #[arg(long, overrides_with = "no_report")]
    report: bool,

    /// Skip the run report
    #[arg(long = "no-report", overrides_with = "report")]
    no_report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    let loaded = load_layered_yaml(&cli.config_paths)?;
    let unused = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !unused.is_clean() {
        warn!(keys = ?unused.unused_leaf_pointers, "unused config keys");
    }
    let config = loaded.settings()?;

    let tokens = if cli.scenarios.is_empty() {
        config.host.default_scenarios.clone()
    } else {
        cli.scenarios.clone()
    };
    let specs = parse_scenario_specs(&tokens)?;
    let payload = load_positions(&cli.positions)?;
    info!(rows = payload.rows.len(), scenarios = specs.len(), "positions loaded");

    let command = cli
        .worker
        .clone()
        .unwrap_or_else(|| config.host.worker_command.clone());
    let mut worker = WorkerProcess::spawn(&command, &config.host.worker_args)?
        .with_timeout(Duration::from_secs(config.host.call_timeout_secs));

    let tools = worker.client().read_initialized().await?;
    let tool_names: Vec<String> = tools.iter().map(|t| t.name().to_string()).collect();
    println!("Worker tools loaded:");
    for name in &tool_names {
        println!(" - {name}");
    }

    let quality = match worker
        .client()
        .call_tool_result("analyze_portfolio_quality", payload.to_arguments())
        .await
    {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "quality check failed");
            quality_error_payload(&e)
        }
    };
    let quality_summary = format_quality_summary(&quality);

    let mut scenario_args = payload.to_arguments();
    scenario_args["adjustments"] = serde_json::to_value(&specs).context("encode adjustments")?;
    let scenarios = match worker
        .client()
        .call_tool_result("simulate_scenarios", scenario_args)
        .await
    {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, "scenario simulation failed");
            None
        }
    };

    println!("\nData quality:\n{quality_summary}\n");
    println!("{}", summarize_scenarios(scenarios.as_ref()));

    if cli.report || !cli.no_report {
        let written = write_run_report(WriteRunReportArgs {
            exports_root: Path::new(&config.host.exports_dir),
            config_hash: &loaded.config_hash,
            positions_file: &cli.positions,
            tools: tool_names,
            quality_summary: &quality_summary,
            quality,
            scenarios: scenarios.unwrap_or(Value::Null),
        })?;
        println!("\nrun_id={}", written.run_id);
        println!("report={}", written.report_path.display());
    }

    worker.shutdown().await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
