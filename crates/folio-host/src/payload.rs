//! Position payload files.
//!
//! Accepted shapes:
//! - `{"rows": [...], "price_map": {"SYM": price, ...}}` (price_map optional)
//! - a bare array of rows
//!
//! Rows are passed to the worker as-is apart from upper-casing string
//! symbols; the worker does the lenient field decoding. Price-map keys are
//! upper-cased and non-numeric prices dropped.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use folio_analytics::{lenient, PriceMap};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionsPayload {
    pub rows: Vec<Map<String, Value>>,
    pub price_map: PriceMap,
}

impl PositionsPayload {
    /// Arguments shared by the batch tools.
    pub fn to_arguments(&self) -> Value {
        json!({ "rows": self.rows, "price_map": self.price_map })
    }
}

pub fn load_positions(path: &Path) -> Result<PositionsPayload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read positions file: {}", path.display()))?;
    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("positions file is not valid JSON: {}", path.display()))?;
    parse_positions(v)
}

pub fn parse_positions(v: Value) -> Result<PositionsPayload> {
    let (rows, price_map) = match v {
        Value::Array(rows) => (rows, Value::Null),
        Value::Object(mut obj) => {
            let rows = match obj.remove("rows") {
                Some(Value::Array(rows)) => rows,
                Some(_) => bail!("'rows' must be an array"),
                None => bail!("positions payload has no 'rows'"),
            };
            (rows, obj.remove("price_map").unwrap_or(Value::Null))
        }
        _ => bail!("positions payload must be an object or an array of rows"),
    };

    let mut out_rows = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let Value::Object(mut row) = row else {
            bail!("row {i} is not an object");
        };
        if let Some(Value::String(s)) = row.get_mut("symbol") {
            *s = s.trim().to_uppercase();
        }
        out_rows.push(row);
    }

    let price_map = lenient::price_map(&price_map)
        .into_iter()
        .map(|(k, px)| (k.trim().to_uppercase(), px))
        .collect();

    Ok(PositionsPayload {
        rows: out_rows,
        price_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_payload_normalises_symbols() {
        let p = parse_positions(json!({
            "rows": [{"symbol": " aapl ", "qty": 1, "cost": 10}],
            "price_map": {"aapl": 12.5, "msft": "n/a"}
        }))
        .unwrap();
        assert_eq!(p.rows[0]["symbol"], json!("AAPL"));
        assert_eq!(p.price_map.get("AAPL"), Some(&12.5));
        assert_eq!(p.price_map.len(), 1);
    }

    #[test]
    fn bare_array_has_empty_price_map() {
        let p = parse_positions(json!([{"symbol": 600519, "qty": "5"}])).unwrap();
        assert_eq!(p.rows.len(), 1);
        assert_eq!(p.rows[0]["symbol"], json!(600519));
        assert!(p.price_map.is_empty());
    }

    #[test]
    fn rejects_non_object_rows() {
        assert!(parse_positions(json!({"rows": [1]})).is_err());
        assert!(parse_positions(json!({"price_map": {}})).is_err());
        assert!(parse_positions(json!("rows")).is_err());
    }
}
