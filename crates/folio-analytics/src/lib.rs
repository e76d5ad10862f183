//! folio-analytics
//!
//! Portfolio analytics behind the worker tools:
//! - per-position PnL with a combined entry/exit fee rate
//! - multi-position aggregation with long/short buckets and per-row errors
//! - data quality analysis (missing price, zero qty, oversized qty, zero cost)
//! - price scenario simulation with a zero price floor
//!
//! Pure deterministic logic (no IO, no time, no shared state). Every call
//! allocates fresh values; nothing survives between calls.

mod portfolio;
mod position;
mod types;

pub mod lenient;
pub mod quality;
pub mod scenario;

pub use portfolio::{calc_portfolio_pnl, resolve_price, MISSING_PRICE};
pub use position::calc_position_pnl;
pub use quality::{
    analyze_portfolio_quality, QualityReport, QualityStatus, DEFAULT_MAX_ABS_QTY, NO_ANOMALIES,
};
pub use scenario::{
    simulate_scenarios, ScenarioOutcome, ScenarioResult, ScenarioSpec, ScenarioTotals,
};
pub use types::{
    AnalyticsError, PortfolioPnl, PortfolioTotals, PositionEntry, PositionError, PositionResult,
    PositionRow, PriceMap, Side,
};

/// Helper to build a PriceMap with minimal boilerplate.
pub fn prices<I, S>(items: I) -> PriceMap
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    let mut m = PriceMap::new();
    for (sym, px) in items {
        m.insert(sym.into(), px);
    }
    m
}
