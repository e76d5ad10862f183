use folio_analytics::{
    calc_portfolio_pnl, calc_position_pnl, prices, PortfolioTotals, PositionResult, PositionRow,
};

const EPS: f64 = 1e-9;

fn assert_close(a: f64, b: f64, what: &str) {
    assert!((a - b).abs() < EPS, "{what}: {a} != {b}");
}

fn sum(results: &[&PositionResult]) -> (f64, f64, f64, f64, f64) {
    results.iter().fold((0.0, 0.0, 0.0, 0.0, 0.0), |acc, r| {
        (
            acc.0 + r.gross_pnl,
            acc.1 + r.net_pnl,
            acc.2 + r.gross_cost_value,
            acc.3 + r.market_value,
            acc.4 + r.fees,
        )
    })
}

fn assert_bucket(totals: &PortfolioTotals, results: &[&PositionResult]) {
    let (gross, net, cost, mv, fees) = sum(results);
    assert_close(totals.gross_pnl, gross, "gross_pnl");
    assert_close(totals.net_pnl, net, "net_pnl");
    assert_close(totals.gross_cost_value, cost, "gross_cost_value");
    assert_close(totals.market_value, mv, "market_value");
    assert_close(totals.fees, fees, "fees");
    assert_eq!(totals.position_count, results.len());
}

fn mixed_rows() -> Vec<PositionRow> {
    vec![
        PositionRow::new("AAPL", 10.0, 150.0, Some(170.0)),
        PositionRow::new("TSLA", -5.0, 250.0, Some(230.0)),
        PositionRow::new("MSFT", 3.0, 300.0, None),
        PositionRow::new("NVDA", -2.0, 400.0, Some(450.0)),
    ]
}

#[test]
fn scenario_totals_equal_sum_of_positions_for_mixed_book() {
    let pm = prices([("MSFT", 320.0)]);
    let out = calc_portfolio_pnl(&mixed_rows(), Some(&pm), 0.001).expect("non-empty rows");

    let all: Vec<_> = out.valid_positions().collect();
    assert_eq!(all.len(), 4);
    assert_bucket(&out.totals, &all);

    let longs: Vec<_> = all.iter().copied().filter(|r| r.qty >= 0.0).collect();
    let shorts: Vec<_> = all.iter().copied().filter(|r| r.qty < 0.0).collect();
    assert_bucket(&out.long_totals, &longs);
    assert_bucket(&out.short_totals, &shorts);

    // bucket pct derived from bucket sums with the same zero guard
    assert_close(
        out.totals.gross_pnl_pct,
        out.totals.gross_pnl / out.totals.gross_cost_value,
        "gross_pnl_pct",
    );
}

#[test]
fn scenario_all_long_book_has_empty_short_bucket() {
    let rows = vec![
        PositionRow::new("A", 1.0, 10.0, Some(11.0)),
        PositionRow::new("B", 2.0, 20.0, Some(19.0)),
    ];
    let out = calc_portfolio_pnl(&rows, None, 0.0).unwrap();
    assert_eq!(out.short_totals, PortfolioTotals::default());
    assert_eq!(out.long_totals, out.totals);
}

#[test]
fn scenario_all_short_book_has_empty_long_bucket() {
    let rows = vec![
        PositionRow::new("A", -1.0, 10.0, Some(11.0)),
        PositionRow::new("B", -2.0, 20.0, Some(19.0)),
    ];
    let out = calc_portfolio_pnl(&rows, None, 0.0).unwrap();
    assert_eq!(out.long_totals, PortfolioTotals::default());
    assert_eq!(out.short_totals, out.totals);
    // (11-10)*-1 + (19-20)*-2 = -1 + 2 = 1
    assert_close(out.totals.gross_pnl, 1.0, "gross_pnl");
}

#[test]
fn scenario_end_to_end_reference_numbers() {
    let row = vec![PositionRow::new("X", 10.0, 100.0, Some(110.0))];

    let no_fee = calc_portfolio_pnl(&row, None, 0.0).unwrap();
    assert_close(no_fee.totals.gross_pnl, 100.0, "gross_pnl");
    assert_close(no_fee.totals.gross_cost_value, 1000.0, "gross_cost_value");
    assert_close(no_fee.totals.gross_pnl_pct, 0.10, "gross_pnl_pct");

    let with_fee = calc_portfolio_pnl(&row, None, 0.01).unwrap();
    assert_close(with_fee.totals.fees, 21.0, "fees");
    assert_close(with_fee.totals.net_pnl, 79.0, "net_pnl");
}

#[test]
fn scenario_net_pnl_is_gross_minus_fees_exactly() {
    for (cost, qty, price, fee) in [
        (100.0, 10.0, 110.0, 0.01),
        (3.7, -12.5, 2.9, 0.0025),
        (0.0, 4.0, 1.0, 0.003),
        (52.1, 0.0, 60.0, 0.01),
    ] {
        let r = calc_position_pnl(cost, qty, price, None, fee);
        assert_eq!(r.net_pnl, r.gross_pnl - r.fees);
        assert_eq!(r.fees, fee * (r.gross_cost_value + r.market_value));
    }
}

#[test]
fn scenario_zero_cost_basis_yields_zero_pct_not_nan() {
    let rows = vec![
        PositionRow::new("GIFT", 10.0, 0.0, Some(5.0)),
        PositionRow::new("FLAT", 0.0, 10.0, Some(5.0)),
    ];
    let out = calc_portfolio_pnl(&rows, None, 0.01).unwrap();
    assert_eq!(out.totals.gross_cost_value, 0.0);
    assert_eq!(out.totals.gross_pnl_pct, 0.0);
    assert_eq!(out.totals.net_pnl_pct, 0.0);
    for r in out.valid_positions() {
        assert_eq!(r.gross_pnl_pct, 0.0);
        assert_eq!(r.net_pnl_pct, 0.0);
    }
}
