use crate::types::{pct_of, PositionResult, Side};

/// Compute the PnL record for a single position.
///
/// Rules:
/// - side is long iff qty >= 0
/// - monetary magnitudes use |qty|; gross_pnl keeps the sign of qty so a
///   short gains when price falls below cost
/// - one combined fee rate is charged on entry notional + current notional
/// - pct fields are 0 when gross_cost_value is 0 (including cost == 0)
///
/// Pure, deterministic, no IO.
pub fn calc_position_pnl(
    cost: f64,
    qty: f64,
    price: f64,
    symbol: Option<&str>,
    fee_rate: f64,
) -> PositionResult {
    let abs_qty = qty.abs();

    let gross_cost_value = abs_qty * cost;
    let market_value = abs_qty * price;
    let gross_pnl = (price - cost) * qty;
    let fees = fee_rate * (gross_cost_value + market_value);
    let net_pnl = gross_pnl - fees;

    PositionResult {
        symbol: symbol.map(str::to_string),
        side: Side::from_qty(qty),
        qty,
        cost_price: cost,
        market_price: price,
        gross_cost_value,
        market_value,
        gross_pnl,
        fees,
        net_pnl,
        gross_pnl_pct: pct_of(gross_pnl, gross_cost_value),
        net_pnl_pct: pct_of(net_pnl, gross_cost_value),
        breakeven_price: cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn long_position_without_fees() {
        let r = calc_position_pnl(100.0, 10.0, 110.0, Some("X"), 0.0);
        assert_eq!(r.side, Side::Long);
        assert!(close(r.gross_cost_value, 1000.0));
        assert!(close(r.market_value, 1100.0));
        assert!(close(r.gross_pnl, 100.0));
        assert_eq!(r.fees, 0.0);
        assert_eq!(r.net_pnl, r.gross_pnl);
        assert!(close(r.gross_pnl_pct, 0.10));
        assert_eq!(r.breakeven_price, 100.0);
        assert_eq!(r.symbol.as_deref(), Some("X"));
    }

    #[test]
    fn fee_rate_applies_to_both_notionals() {
        let r = calc_position_pnl(100.0, 10.0, 110.0, Some("X"), 0.01);
        assert!(close(r.fees, 21.0));
        assert!(close(r.net_pnl, 79.0));
        assert!(close(r.net_pnl_pct, 0.079));
    }

    #[test]
    fn short_position_gains_when_price_falls() {
        let r = calc_position_pnl(50.0, -4.0, 40.0, None, 0.0);
        assert_eq!(r.side, Side::Short);
        assert!(close(r.gross_cost_value, 200.0));
        assert!(close(r.market_value, 160.0));
        assert!(close(r.gross_pnl, 40.0));
        assert!(close(r.gross_pnl_pct, 0.2));
        assert!(r.symbol.is_none());
    }

    #[test]
    fn zero_qty_is_long_and_flat() {
        let r = calc_position_pnl(10.0, 0.0, 12.0, Some("Z"), 0.01);
        assert_eq!(r.side, Side::Long);
        assert_eq!(r.gross_cost_value, 0.0);
        assert_eq!(r.gross_pnl_pct, 0.0);
        assert_eq!(r.net_pnl_pct, 0.0);
    }

    #[test]
    fn zero_cost_never_divides_by_zero() {
        let r = calc_position_pnl(0.0, 5.0, 3.0, Some("FREE"), 0.002);
        assert_eq!(r.gross_cost_value, 0.0);
        assert!(close(r.gross_pnl, 15.0));
        assert_eq!(r.gross_pnl_pct, 0.0);
        assert_eq!(r.net_pnl_pct, 0.0);
        assert!(r.net_pnl.is_finite());
    }
}
