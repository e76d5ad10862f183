use anyhow::{Context, Result};
use folio_analytics::{
    analyze_portfolio_quality, calc_portfolio_pnl, calc_position_pnl, lenient, simulate_scenarios,
    AnalyticsError, PositionRow, PriceMap, ScenarioSpec,
};
use folio_config::WorkerSettings;
use folio_registry::{ToolMeta, ToolRegistry};
use folio_schemas::{ParamSpec, ParamType};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::decode_args;

#[derive(Deserialize)]
struct PositionArgs {
    cost: f64,
    qty: f64,
    price: f64,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    fee_rate: Option<f64>,
}

#[derive(Deserialize)]
struct PortfolioArgs {
    rows: Vec<PositionRow>,
    #[serde(default, deserialize_with = "lenient::opt_price_map")]
    price_map: Option<PriceMap>,
    #[serde(default)]
    fee_rate: Option<f64>,
}

#[derive(Deserialize)]
struct QualityArgs {
    rows: Vec<PositionRow>,
    #[serde(default, deserialize_with = "lenient::opt_price_map")]
    price_map: Option<PriceMap>,
    #[serde(default)]
    max_abs_qty: Option<f64>,
}

#[derive(Deserialize)]
struct ScenarioArgs {
    rows: Vec<PositionRow>,
    #[serde(default, deserialize_with = "lenient::opt_price_map")]
    price_map: Option<PriceMap>,
    #[serde(default)]
    adjustments: Vec<ScenarioSpec>,
    #[serde(default)]
    fee_rate: Option<f64>,
}

/// Batch-level analytics failures travel as data inside a `tool_result`.
fn to_result<T: Serialize>(out: Result<T, AnalyticsError>) -> Result<Value> {
    match out {
        Ok(v) => serde_json::to_value(v).context("failed to serialize tool result"),
        Err(e) => Ok(json!({ "error": e.to_string() })),
    }
}

fn rows_param() -> ParamSpec {
    ParamSpec::array_of(ParamSpec::new(ParamType::Object))
        .describe("Position rows: {symbol, qty, cost, price}; numeric strings accepted")
}

fn price_map_param() -> ParamSpec {
    ParamSpec::new(ParamType::Object).describe("Symbol -> price overrides; wins over row prices")
}

fn fee_rate_param() -> ParamSpec {
    ParamSpec::new(ParamType::Number)
        .describe("Combined fee rate applied to cost notional + market notional")
}

pub fn register_analytics_tools(reg: &mut ToolRegistry, settings: &WorkerSettings) -> Result<()> {
    let default_fee = settings.default_fee_rate;
    let default_max_qty = settings.max_abs_qty;

    reg.register(
        ToolMeta::new(
            "calc_position_pnl",
            "Compute gross/net PnL, fees and breakeven for a single position",
        )
        .required_param("cost", ParamSpec::new(ParamType::Number).describe("Cost price per unit"))
        .required_param(
            "qty",
            ParamSpec::new(ParamType::Number).describe("Signed quantity; negative is short"),
        )
        .required_param("price", ParamSpec::new(ParamType::Number).describe("Current price"))
        .param("symbol", ParamSpec::new(ParamType::String))
        .param("fee_rate", fee_rate_param()),
        move |args| {
            let a: PositionArgs = decode_args("calc_position_pnl", args)?;
            let r = calc_position_pnl(
                a.cost,
                a.qty,
                a.price,
                a.symbol.as_deref(),
                a.fee_rate.unwrap_or(default_fee),
            );
            serde_json::to_value(r).context("failed to serialize tool result")
        },
    )?;

    reg.register(
        ToolMeta::new(
            "calc_portfolio_pnl",
            "Aggregate PnL over position rows with overall, long and short totals",
        )
        .required_param("rows", rows_param())
        .param("price_map", price_map_param())
        .param("fee_rate", fee_rate_param()),
        move |args| {
            let a: PortfolioArgs = decode_args("calc_portfolio_pnl", args)?;
            to_result(calc_portfolio_pnl(
                &a.rows,
                a.price_map.as_ref(),
                a.fee_rate.unwrap_or(default_fee),
            ))
        },
    )?;

    reg.register(
        ToolMeta::new(
            "analyze_portfolio_quality",
            "Check position rows for missing prices, zero or oversized quantities and zero costs",
        )
        .required_param("rows", rows_param())
        .param("price_map", price_map_param())
        .param(
            "max_abs_qty",
            ParamSpec::new(ParamType::Number).describe("Flag positions with |qty| above this"),
        ),
        move |args| {
            let a: QualityArgs = decode_args("analyze_portfolio_quality", args)?;
            to_result(analyze_portfolio_quality(
                &a.rows,
                a.price_map.as_ref(),
                a.max_abs_qty.unwrap_or(default_max_qty),
            ))
        },
    )?;

    reg.register(
        ToolMeta::new(
            "simulate_scenarios",
            "Re-price valid positions under percentage/absolute price adjustments",
        )
        .required_param("rows", rows_param())
        .param("price_map", price_map_param())
        .param(
            "adjustments",
            ParamSpec::array_of(ParamSpec::new(ParamType::Object))
                .describe("Scenarios: {label?, pct?, delta?}; pct is fractional (-0.05 = -5%)"),
        )
        .param("fee_rate", fee_rate_param()),
        move |args| {
            let a: ScenarioArgs = decode_args("simulate_scenarios", args)?;
            to_result(simulate_scenarios(
                &a.rows,
                a.price_map.as_ref(),
                &a.adjustments,
                a.fee_rate.unwrap_or(default_fee),
            ))
        },
    )?;

    Ok(())
}
