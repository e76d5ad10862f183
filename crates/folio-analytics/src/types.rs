use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lenient;

/// Position direction. `qty >= 0` is long, `qty < 0` is short.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn from_qty(qty: f64) -> Self {
        if qty >= 0.0 {
            Side::Long
        } else {
            Side::Short
        }
    }
}

/// Symbol -> price override map. Lookup is by exact symbol.
pub type PriceMap = BTreeMap<String, f64>;

/// One input row as it arrives from a position sheet.
///
/// Every field is optional at this level: missing qty/cost/price is a
/// per-row domain error reported by the aggregator, never a decode failure.
/// Numeric fields accept JSON numbers and numeric strings; unknown columns
/// are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRow {
    #[serde(default, deserialize_with = "lenient::opt_symbol")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub qty: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub price: Option<f64>,
}

impl PositionRow {
    pub fn new<S: Into<String>>(symbol: S, qty: f64, cost: f64, price: Option<f64>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            qty: Some(qty),
            cost: Some(cost),
            price,
        }
    }

    /// The symbol when present and non-blank.
    pub fn symbol_key(&self) -> Option<&str> {
        self.symbol.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Fully populated PnL record for one position.
///
/// gross_cost_value = |qty| * cost
/// market_value     = |qty| * price
/// gross_pnl        = (price - cost) * qty
/// fees             = fee_rate * (gross_cost_value + market_value)
/// net_pnl          = gross_pnl - fees
///
/// Percentages are 0 whenever gross_cost_value is 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionResult {
    pub symbol: Option<String>,
    pub side: Side,
    pub qty: f64,
    pub cost_price: f64,
    pub market_price: f64,
    pub gross_cost_value: f64,
    pub market_value: f64,
    pub gross_pnl: f64,
    pub fees: f64,
    pub net_pnl: f64,
    pub gross_pnl_pct: f64,
    pub net_pnl_pct: f64,
    pub breakeven_price: f64,
}

/// A row that could not be priced or lacks qty/cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionError {
    pub symbol: Option<String>,
    pub error: String,
}

/// One entry of the per-row detail list, in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionEntry {
    Valid(PositionResult),
    Invalid(PositionError),
}

impl PositionEntry {
    pub fn as_valid(&self) -> Option<&PositionResult> {
        match self {
            PositionEntry::Valid(r) => Some(r),
            PositionEntry::Invalid(_) => None,
        }
    }

    pub fn as_invalid(&self) -> Option<&PositionError> {
        match self {
            PositionEntry::Valid(_) => None,
            PositionEntry::Invalid(e) => Some(e),
        }
    }
}

/// Summed totals over a bucket of positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub gross_pnl: f64,
    pub net_pnl: f64,
    pub gross_cost_value: f64,
    pub market_value: f64,
    pub fees: f64,
    pub gross_pnl_pct: f64,
    pub net_pnl_pct: f64,
    /// Number of valid positions summed into this bucket.
    pub position_count: usize,
}

/// Output of [`crate::calc_portfolio_pnl`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPnl {
    pub totals: PortfolioTotals,
    pub long_totals: PortfolioTotals,
    pub short_totals: PortfolioTotals,
    pub positions: Vec<PositionEntry>,
    /// Rows processed (successes + errors).
    pub count: usize,
}

impl PortfolioPnl {
    pub fn valid_positions(&self) -> impl Iterator<Item = &PositionResult> {
        self.positions.iter().filter_map(PositionEntry::as_valid)
    }

    pub fn invalid_positions(&self) -> impl Iterator<Item = &PositionError> {
        self.positions.iter().filter_map(PositionEntry::as_invalid)
    }
}

/// Errors that abort a whole aggregation (as opposed to per-row errors).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalyticsError {
    /// No rows were supplied.
    EmptyRows,
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRows => write!(f, "rows is empty"),
        }
    }
}

impl std::error::Error for AnalyticsError {}

/// Zero-guarded ratio: 0 when the denominator is 0.
pub(crate) fn pct_of(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
