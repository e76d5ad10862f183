//! Run report written under the exports directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub schema_version: i32,
    pub run_id: Uuid,
    pub created_at_utc: DateTime<Utc>,
    pub config_hash: String,
    pub positions_file: String,
    pub tools: Vec<String>,
    pub quality_summary: String,
    pub quality: Value,
    pub scenarios: Value,
}

pub struct WriteRunReportArgs<'a> {
    pub exports_root: &'a Path,
    pub config_hash: &'a str,
    pub positions_file: &'a Path,
    pub tools: Vec<String>,
    pub quality_summary: &'a str,
    pub quality: Value,
    pub scenarios: Value,
}

pub struct WriteRunReportResult {
    pub run_id: Uuid,
    pub run_dir: PathBuf,
    pub report_path: PathBuf,
}

pub fn write_run_report(args: WriteRunReportArgs<'_>) -> Result<WriteRunReportResult> {
    let run_id = Uuid::new_v4();

    // exports/<run_id>/
    let run_dir = args.exports_root.join(run_id.to_string());
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create exports dir failed: {}", run_dir.display()))?;

    let report = RunReport {
        schema_version: 1,
        run_id,
        created_at_utc: Utc::now(),
        config_hash: args.config_hash.to_string(),
        positions_file: args.positions_file.display().to_string(),
        tools: args.tools,
        quality_summary: args.quality_summary.to_string(),
        quality: args.quality,
        scenarios: args.scenarios,
    };

    let report_path = run_dir.join("report.json");
    let json = serde_json::to_string_pretty(&report).context("serialize run report failed")?;
    fs::write(&report_path, format!("{json}\n"))
        .with_context(|| format!("write run report failed: {}", report_path.display()))?;

    Ok(WriteRunReportResult {
        run_id,
        run_dir,
        report_path,
    })
}
