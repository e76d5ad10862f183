use crate::position::calc_position_pnl;
use crate::types::{
    pct_of, AnalyticsError, PortfolioPnl, PortfolioTotals, PositionEntry, PositionError,
    PositionResult, PositionRow, PriceMap, Side,
};

pub const MISSING_PRICE: &str = "missing price, and no override map entry";

/// Running sums for one bucket. Percentages are derived once in `finish`.
#[derive(Clone, Debug, Default)]
pub(crate) struct TotalsAccumulator {
    gross_pnl: f64,
    net_pnl: f64,
    gross_cost_value: f64,
    market_value: f64,
    fees: f64,
    position_count: usize,
}

impl TotalsAccumulator {
    pub(crate) fn add(&mut self, r: &PositionResult) {
        self.gross_pnl += r.gross_pnl;
        self.net_pnl += r.net_pnl;
        self.gross_cost_value += r.gross_cost_value;
        self.market_value += r.market_value;
        self.fees += r.fees;
        self.position_count += 1;
    }

    pub(crate) fn finish(self) -> PortfolioTotals {
        PortfolioTotals {
            gross_pnl: self.gross_pnl,
            net_pnl: self.net_pnl,
            gross_cost_value: self.gross_cost_value,
            market_value: self.market_value,
            fees: self.fees,
            gross_pnl_pct: pct_of(self.gross_pnl, self.gross_cost_value),
            net_pnl_pct: pct_of(self.net_pnl, self.gross_cost_value),
            position_count: self.position_count,
        }
    }
}

/// Resolve the effective price for a row.
///
/// A non-blank symbol present in `price_map` wins; otherwise the row's own price.
pub fn resolve_price(row: &PositionRow, price_map: Option<&PriceMap>) -> Option<f64> {
    let from_map = match (row.symbol_key(), price_map) {
        (Some(sym), Some(pm)) => pm.get(sym).copied(),
        _ => None,
    };
    from_map.or(row.price)
}

fn missing_fields_message(row: &PositionRow) -> &'static str {
    match (row.qty.is_none(), row.cost.is_none()) {
        (true, false) => "missing qty",
        (false, true) => "missing cost",
        _ => "missing qty and cost",
    }
}

/// Price one row, or explain why it cannot be priced.
fn evaluate_row(
    row: &PositionRow,
    price_map: Option<&PriceMap>,
    fee_rate: f64,
) -> Result<PositionResult, PositionError> {
    let invalid = |msg: &str| PositionError {
        symbol: row.symbol.clone(),
        error: msg.to_string(),
    };

    let (qty, cost) = match (row.qty, row.cost) {
        (Some(q), Some(c)) => (q, c),
        _ => return Err(invalid(missing_fields_message(row))),
    };

    let price = resolve_price(row, price_map).ok_or_else(|| invalid(MISSING_PRICE))?;

    Ok(calc_position_pnl(
        cost,
        qty,
        price,
        row.symbol.as_deref(),
        fee_rate,
    ))
}

/// Aggregate PnL over a batch of position rows.
///
/// - empty `rows` is the only batch-level failure
/// - rows missing qty/cost/price become error entries and are excluded from
///   totals; processing continues with the next row
/// - detail entries keep input order; `count` = successes + errors
pub fn calc_portfolio_pnl(
    rows: &[PositionRow],
    price_map: Option<&PriceMap>,
    fee_rate: f64,
) -> Result<PortfolioPnl, AnalyticsError> {
    if rows.is_empty() {
        return Err(AnalyticsError::EmptyRows);
    }

    let mut overall = TotalsAccumulator::default();
    let mut long = TotalsAccumulator::default();
    let mut short = TotalsAccumulator::default();
    let mut positions = Vec::with_capacity(rows.len());

    for row in rows {
        match evaluate_row(row, price_map, fee_rate) {
            Ok(result) => {
                overall.add(&result);
                match result.side {
                    Side::Long => long.add(&result),
                    Side::Short => short.add(&result),
                }
                positions.push(PositionEntry::Valid(result));
            }
            Err(e) => positions.push(PositionEntry::Invalid(e)),
        }
    }

    Ok(PortfolioPnl {
        totals: overall.finish(),
        long_totals: long.finish(),
        short_totals: short.finish(),
        count: positions.len(),
        positions,
    })
}
