//! Price-scenario simulation over a position batch.
//!
//! The base case is one aggregator run at resolved prices. Each scenario
//! rebuilds the successfully priced positions at
//! `max(price * (1 + pct) + delta, 0)` and reruns the aggregator on those
//! rows only. Rows that failed pricing are carried through as
//! `invalid_positions` and never simulated.

use serde::{Deserialize, Serialize};

use crate::lenient;
use crate::portfolio::calc_portfolio_pnl;
use crate::types::{AnalyticsError, PortfolioTotals, PositionError, PositionRow, PriceMap};

pub const CURRENT_PRICE_LABEL: &str = "current price";
pub const NO_VALID_POSITIONS_LABEL: &str = "no valid positions";

// ---------------------------------------------------------------------------
// Scenario spec
// ---------------------------------------------------------------------------

/// A price adjustment. `pct` is fractional (-0.05 = -5%), `delta` is an
/// absolute price shift applied after the percentage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawScenarioSpec")]
pub struct ScenarioSpec {
    pub label: String,
    pub pct: f64,
    pub delta: f64,
}

#[derive(Deserialize)]
struct RawScenarioSpec {
    #[serde(default)]
    label: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pct: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    delta: Option<f64>,
}

impl From<RawScenarioSpec> for ScenarioSpec {
    fn from(raw: RawScenarioSpec) -> Self {
        ScenarioSpec::new(raw.label, raw.pct.unwrap_or(0.0), raw.delta.unwrap_or(0.0))
    }
}

impl ScenarioSpec {
    /// Build a spec; a missing or blank label is derived from the adjustment.
    pub fn new(label: Option<String>, pct: f64, delta: f64) -> Self {
        let label = match label {
            Some(l) if !l.trim().is_empty() => l.trim().to_string(),
            _ => default_label(pct, delta),
        };
        Self { label, pct, delta }
    }

    /// The no-op scenario used when no adjustments are supplied.
    pub fn current_price() -> Self {
        Self {
            label: CURRENT_PRICE_LABEL.to_string(),
            pct: 0.0,
            delta: 0.0,
        }
    }

    /// Clamp rule: never below zero.
    pub fn apply(&self, price: f64) -> f64 {
        (price * (1.0 + self.pct) + self.delta).max(0.0)
    }
}

fn trim_float(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn default_label(pct: f64, delta: f64) -> String {
    let mut parts = Vec::new();
    if pct != 0.0 {
        parts.push(format!("{:+}%", trim_float(pct * 100.0)));
    }
    if delta != 0.0 {
        parts.push(format!("{:+}", trim_float(delta)));
    }
    if parts.is_empty() {
        CURRENT_PRICE_LABEL.to_string()
    } else {
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Reduced totals shape used for scenario comparison.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTotals {
    pub market_value: f64,
    pub cost_value: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
}

impl From<&PortfolioTotals> for ScenarioTotals {
    /// Net figures; with a zero fee rate they equal the gross ones.
    fn from(t: &PortfolioTotals) -> Self {
        Self {
            market_value: t.market_value,
            cost_value: t.gross_cost_value,
            pnl: t.net_pnl,
            pnl_pct: t.net_pnl_pct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub label: String,
    pub pct: f64,
    pub delta: f64,
    pub totals: ScenarioTotals,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub base_totals: ScenarioTotals,
    pub scenarios: Vec<ScenarioOutcome>,
    pub invalid_positions: Vec<PositionError>,
    /// Rows processed in the base run (valid + invalid).
    pub position_count: usize,
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Simulate each adjustment against the base portfolio.
///
/// Empty `adjustments` means a single current-price scenario. Fails only
/// when `rows` is empty.
pub fn simulate_scenarios(
    rows: &[PositionRow],
    price_map: Option<&PriceMap>,
    adjustments: &[ScenarioSpec],
    fee_rate: f64,
) -> Result<ScenarioResult, AnalyticsError> {
    let base = calc_portfolio_pnl(rows, price_map, fee_rate)?;

    let valid: Vec<_> = base.valid_positions().cloned().collect();
    let invalid_positions: Vec<_> = base.invalid_positions().cloned().collect();

    let defaults = [ScenarioSpec::current_price()];
    let specs = if adjustments.is_empty() {
        &defaults[..]
    } else {
        adjustments
    };

    let mut scenarios = Vec::with_capacity(specs.len());
    if valid.is_empty() {
        scenarios.push(ScenarioOutcome {
            label: NO_VALID_POSITIONS_LABEL.to_string(),
            pct: 0.0,
            delta: 0.0,
            totals: ScenarioTotals::default(),
        });
    } else {
        for spec in specs {
            let scenario_rows: Vec<PositionRow> = valid
                .iter()
                .map(|p| PositionRow {
                    symbol: p.symbol.clone(),
                    qty: Some(p.qty),
                    cost: Some(p.cost_price),
                    price: Some(spec.apply(p.market_price)),
                })
                .collect();
            let run = calc_portfolio_pnl(&scenario_rows, None, fee_rate)?;
            scenarios.push(ScenarioOutcome {
                label: spec.label.clone(),
                pct: spec.pct,
                delta: spec.delta,
                totals: ScenarioTotals::from(&run.totals),
            });
        }
    }

    Ok(ScenarioResult {
        base_totals: ScenarioTotals::from(&base.totals),
        scenarios,
        invalid_positions,
        position_count: base.count,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
