//! folio-worker entry point.
//!
//! Thin: tracing to stderr, config, registry, then the dispatch loop over
//! locked stdin/stdout.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use folio_config::{load_layered_yaml, report_unused_keys, UnusedKeyPolicy};
use folio_worker::{build_registry, Dispatcher};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "folio-worker")]
#[command(
    about = "Portfolio analytics tool worker (line-delimited JSON over stdio)",
    long_about = None
)]
struct Cli {
    /// Layered config paths in merge order
    #[arg(long = "config")]
    config_paths: Vec<String>,
}

fn main() -> Result<()> {
    // Silent if the file does not exist.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    let loaded = load_layered_yaml(&cli.config_paths)?;
    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    if !report.is_clean() {
        warn!(keys = ?report.unused_leaf_pointers, "unused config keys");
    }
    let config = loaded.settings()?;
    info!(config_hash = %loaded.config_hash, "config loaded");

    let registry = build_registry(&config.worker).context("failed to build tool registry")?;
    let dispatcher = Dispatcher::new(&registry);

    let stdin = io::stdin();
    let stdout = io::stdout();
    dispatcher.run(stdin.lock(), stdout.lock())?;
    Ok(())
}

/// stdout carries the protocol, so the subscriber writes to stderr.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
