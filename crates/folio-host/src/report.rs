//! Console text for tool results.

use serde_json::Value;

pub const NO_SCENARIO_RESULTS: &str = "No scenario results.";
pub const SCENARIO_HEADER: &str = "Scenario comparison:";
pub const QUALITY_CHECK_FAILED: &str = "Quality check failed";

/// Payload standing in for a quality result when the call itself failed.
pub fn quality_error_payload(err: &anyhow::Error) -> Value {
    serde_json::json!({ "error": format!("{err:#}") })
}

/// Quality summary text: the `summary` field, else the warnings joined with
/// `"; "`, else an `error` payload, else the raw JSON.
pub fn format_quality_summary(payload: &Value) -> String {
    if let Some(s) = payload.get("summary").and_then(Value::as_str) {
        if !s.is_empty() {
            return s.to_string();
        }
    }
    let warnings: Vec<&str> = payload
        .get("warnings")
        .and_then(Value::as_array)
        .map(|ws| ws.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if !warnings.is_empty() {
        return warnings.join("; ");
    }
    if let Some(e) = payload.get("error").and_then(Value::as_str) {
        return format!("{QUALITY_CHECK_FAILED}: {e}");
    }
    payload.to_string()
}

/// One line per scenario with net PnL and net PnL %.
pub fn summarize_scenarios(payload: Option<&Value>) -> String {
    let Some(payload) = payload.filter(|p| !p.is_null()) else {
        return NO_SCENARIO_RESULTS.to_string();
    };

    let mut lines = vec![SCENARIO_HEADER.to_string()];
    let scenarios = payload
        .get("scenarios")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for item in scenarios {
        let label = match item.get("label") {
            Some(Value::String(s)) => s.clone(),
            Some(v) if !v.is_null() => v.to_string(),
            _ => "(unnamed)".to_string(),
        };
        let totals = item.get("totals");
        let pnl = totals.and_then(|t| t.get("pnl")).and_then(Value::as_f64);
        let pnl_pct = totals
            .and_then(|t| t.get("pnl_pct"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        lines.push(match pnl {
            Some(pnl) => format!(
                "- {label}: net pnl {pnl:.2}, net pnl% {:.2}%",
                pnl_pct * 100.0
            ),
            None => format!("- {label}: could not be computed"),
        });
    }
    lines.join("\n")
}
