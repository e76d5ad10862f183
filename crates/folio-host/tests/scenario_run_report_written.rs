use std::fs;
use std::path::Path;

use folio_host::artifacts::{write_run_report, RunReport, WriteRunReportArgs};
use serde_json::json;

#[test]
fn report_lands_under_run_id_directory() {
    let dir = tempfile::tempdir().unwrap();

    let written = write_run_report(WriteRunReportArgs {
        exports_root: dir.path(),
        config_hash: "abc123",
        positions_file: Path::new("positions.json"),
        tools: vec!["analyze_portfolio_quality".to_string()],
        quality_summary: "No data anomalies detected.",
        quality: json!({"status": "ok"}),
        scenarios: json!({"scenarios": []}),
    })
    .unwrap();

    assert_eq!(written.run_dir, dir.path().join(written.run_id.to_string()));
    assert_eq!(written.report_path, written.run_dir.join("report.json"));

    let raw = fs::read_to_string(&written.report_path).unwrap();
    assert!(raw.ends_with('\n'));
    let report: RunReport = serde_json::from_str(&raw).unwrap();
    assert_eq!(report.run_id, written.run_id);
    assert_eq!(report.config_hash, "abc123");
    assert_eq!(report.quality["status"], json!("ok"));
    assert_eq!(report.positions_file, "positions.json");
}

#[test]
fn two_runs_get_distinct_directories() {
    let dir = tempfile::tempdir().unwrap();
    let args = || WriteRunReportArgs {
        exports_root: dir.path(),
        config_hash: "h",
        positions_file: Path::new("p.json"),
        tools: vec![],
        quality_summary: "",
        quality: json!(null),
        scenarios: json!(null),
    };
    let a = write_run_report(args()).unwrap();
    let b = write_run_report(args()).unwrap();
    assert_ne!(a.run_dir, b.run_dir);
}
