//! Data quality report for a batch of position rows.
//!
//! Runs the aggregator and classifies every detail entry:
//! - error entries whose message mentions price -> missing price
//! - other error entries -> invalid rows
//! - valid entries with qty == 0 -> zero qty
//! - valid entries with |qty| > threshold -> oversized qty
//! - valid entries with cost price 0 -> zero cost
//!
//! Symbol lists are deduplicated and sorted. Warning lines are emitted in a
//! fixed order and the summary text is consumed verbatim downstream, so its
//! shape must not drift.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::portfolio::calc_portfolio_pnl;
use crate::types::{AnalyticsError, PortfolioTotals, PositionEntry, PositionRow, PriceMap};

/// Default |qty| threshold above which a position is flagged.
pub const DEFAULT_MAX_ABS_QTY: f64 = 1_000_000.0;

/// Summary text when nothing was flagged.
pub const NO_ANOMALIES: &str = "No data anomalies detected.";

/// Header of the bulleted warning block.
pub const WARNINGS_HEADER: &str = "Data quality warnings:";

/// Placeholder used in symbol lists for rows without a symbol.
pub const NO_SYMBOL: &str = "(no symbol)";

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityStatus {
    Ok,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub status: QualityStatus,
    /// Ordered: missing price, zero qty, oversized qty, zero cost, invalid rows.
    pub warnings: Vec<String>,
    pub summary: String,
    /// Rows processed (valid + invalid).
    pub position_count: usize,
    /// Overall totals of the valid rows.
    pub pnl_snapshot: PortfolioTotals,
    pub max_abs_qty: f64,
    pub missing_price_symbols: Vec<String>,
    pub zero_qty_symbols: Vec<String>,
    pub oversized_qty_symbols: Vec<String>,
    pub zero_cost_symbols: Vec<String>,
    pub invalid_row_symbols: Vec<String>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.status == QualityStatus::Ok
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Buckets {
    missing_price: BTreeSet<String>,
    zero_qty: BTreeSet<String>,
    oversized_qty: BTreeSet<String>,
    zero_cost: BTreeSet<String>,
    invalid: BTreeSet<String>,
}

fn label(symbol: Option<&str>) -> String {
    match symbol.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NO_SYMBOL.to_string(),
    }
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Render a threshold without a trailing `.0` for whole numbers.
fn format_threshold(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{}", x as i64)
    } else {
        format!("{x}")
    }
}

/// Build the summary string from warning lines.
pub fn render_summary(warnings: &[String]) -> String {
    if warnings.is_empty() {
        return NO_ANOMALIES.to_string();
    }
    let mut out = String::from(WARNINGS_HEADER);
    for w in warnings {
        out.push_str("\n- ");
        out.push_str(w);
    }
    out
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Analyze a batch of rows for data anomalies.
///
/// Fails only when `rows` is empty (same contract as the aggregator).
/// PnL is computed without fees; the snapshot is informational.
pub fn analyze_portfolio_quality(
    rows: &[PositionRow],
    price_map: Option<&PriceMap>,
    max_abs_qty: f64,
) -> Result<QualityReport, AnalyticsError> {
    let pnl = calc_portfolio_pnl(rows, price_map, 0.0)?;

    let mut b = Buckets::default();
    for entry in &pnl.positions {
        match entry {
            PositionEntry::Invalid(e) => {
                let sym = label(e.symbol.as_deref());
                if e.error.to_ascii_lowercase().contains("price") {
                    b.missing_price.insert(sym);
                } else {
                    b.invalid.insert(sym);
                }
            }
            PositionEntry::Valid(r) => {
                let sym = label(r.symbol.as_deref());
                if r.qty == 0.0 {
                    b.zero_qty.insert(sym.clone());
                }
                if r.qty.abs() > max_abs_qty {
                    b.oversized_qty.insert(sym.clone());
                }
                if r.cost_price == 0.0 {
                    b.zero_cost.insert(sym);
                }
            }
        }
    }

    let mut warnings = Vec::new();
    if !b.missing_price.is_empty() {
        warnings.push(format!("missing price: {}", join(&b.missing_price)));
    }
    if !b.zero_qty.is_empty() {
        warnings.push(format!("zero qty: {}", join(&b.zero_qty)));
    }
    if !b.oversized_qty.is_empty() {
        warnings.push(format!(
            "qty exceeds {}: {}",
            format_threshold(max_abs_qty),
            join(&b.oversized_qty)
        ));
    }
    if !b.zero_cost.is_empty() {
        warnings.push(format!("zero cost: {}", join(&b.zero_cost)));
    }
    if !b.invalid.is_empty() {
        warnings.push(format!("invalid rows: {}", join(&b.invalid)));
    }

    let status = if warnings.is_empty() {
        QualityStatus::Ok
    } else {
        QualityStatus::Warning
    };
    let summary = render_summary(&warnings);

    Ok(QualityReport {
        status,
        warnings,
        summary,
        position_count: pnl.count,
        pnl_snapshot: pnl.totals,
        max_abs_qty,
        missing_price_symbols: b.missing_price.into_iter().collect(),
        zero_qty_symbols: b.zero_qty.into_iter().collect(),
        oversized_qty_symbols: b.oversized_qty.into_iter().collect(),
        zero_cost_symbols: b.zero_cost.into_iter().collect(),
        invalid_row_symbols: b.invalid.into_iter().collect(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row(sym: &str, qty: f64, cost: f64, price: Option<f64>) -> PositionRow {
        PositionRow::new(sym, qty, cost, price)
    }

    #[test]
    fn clean_batch_is_ok() {
        let rows = [row("B", 5.0, 10.0, Some(12.0))];
        let r = analyze_portfolio_quality(&rows, None, DEFAULT_MAX_ABS_QTY).unwrap();
        assert_eq!(r.status, QualityStatus::Ok);
        assert!(r.warnings.is_empty());
        assert_eq!(r.summary, NO_ANOMALIES);
        assert_eq!(r.position_count, 1);
        assert_eq!(r.pnl_snapshot.gross_pnl, 10.0);
    }

    #[test]
    fn warnings_follow_fixed_order() {
        let rows = vec![
            row("ZC", 1.0, 0.0, Some(1.0)),
            row("BIG", 2_000_000.0, 1.0, Some(1.0)),
            row("ZQ", 0.0, 1.0, Some(1.0)),
            row("NP", 1.0, 1.0, None),
        ];
        let r = analyze_portfolio_quality(&rows, None, DEFAULT_MAX_ABS_QTY).unwrap();
        assert_eq!(
            r.warnings,
            vec![
                "missing price: NP".to_string(),
                "zero qty: ZQ".to_string(),
                "qty exceeds 1000000: BIG".to_string(),
                "zero cost: ZC".to_string(),
            ]
        );
        assert_eq!(r.status, QualityStatus::Warning);
    }

    #[test]
    fn symbol_lists_are_sorted_and_deduplicated() {
        let rows = vec![
            row("B", 1.0, 1.0, None),
            row("A", 1.0, 1.0, None),
            row("B", 2.0, 1.0, None),
        ];
        let r = analyze_portfolio_quality(&rows, None, DEFAULT_MAX_ABS_QTY).unwrap();
        assert_eq!(r.missing_price_symbols, vec!["A", "B"]);
        assert_eq!(r.warnings[0], "missing price: A, B");
    }

    #[test]
    fn summary_is_a_bulleted_block() {
        let rows = [row("A", 0.0, 10.0, Some(10.0))];
        let r = analyze_portfolio_quality(&rows, None, DEFAULT_MAX_ABS_QTY).unwrap();
        assert_eq!(r.summary, "Data quality warnings:\n- zero qty: A");
    }

    #[test]
    fn non_price_errors_are_reported_last() {
        let rows = vec![
            PositionRow {
                symbol: None,
                qty: None,
                cost: Some(1.0),
                price: Some(1.0),
            },
            row("ZQ", 0.0, 1.0, Some(1.0)),
        ];
        let r = analyze_portfolio_quality(&rows, None, DEFAULT_MAX_ABS_QTY).unwrap();
        assert_eq!(r.warnings.len(), 2);
        assert_eq!(r.warnings[0], "zero qty: ZQ");
        assert_eq!(r.warnings[1], "invalid rows: (no symbol)");
    }

    #[test]
    fn custom_threshold_is_rendered() {
        let rows = [row("A", -150.0, 1.0, Some(1.0))];
        let r = analyze_portfolio_quality(&rows, None, 100.0).unwrap();
        assert_eq!(r.warnings, vec!["qty exceeds 100: A".to_string()]);
        assert_eq!(r.oversized_qty_symbols, vec!["A"]);
    }

    #[test]
    fn empty_rows_propagate() {
        assert_eq!(
            analyze_portfolio_quality(&[], None, DEFAULT_MAX_ABS_QTY),
            Err(AnalyticsError::EmptyRows)
        );
    }
}
