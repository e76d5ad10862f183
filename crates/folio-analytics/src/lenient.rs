//! Lenient decoding for values that come out of position sheets.
//!
//! Sheet exports are loosely typed: quantities may arrive as `"10"`,
//! symbols as `600519`, blank cells as `""` or `null`. These helpers
//! normalise such values without failing the whole request; anything that
//! cannot be read as a number is treated as absent.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::PriceMap;

/// Read a JSON value as a finite `f64`.
///
/// Accepts numbers and trimmed numeric strings. Everything else is `None`.
pub fn number(v: &Value) -> Option<f64> {
    let x = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            t.parse::<f64>().ok()?
        }
        _ => return None,
    };
    x.is_finite().then_some(x)
}

/// Read a JSON value as a symbol string. Numbers render in their JSON form;
/// blank strings are `None`.
pub fn symbol(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a [`PriceMap`] from a JSON object, dropping non-numeric entries.
///
/// Keys are trimmed like row symbols; blank keys are dropped.
pub fn price_map(v: &Value) -> PriceMap {
    let mut out = PriceMap::new();
    if let Value::Object(map) = v {
        for (k, raw) in map {
            let key = k.trim();
            if key.is_empty() {
                continue;
            }
            if let Some(px) = number(raw) {
                out.insert(key.to_string(), px);
            }
        }
    }
    out
}

pub(crate) fn opt_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(number))
}

pub(crate) fn opt_symbol<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().and_then(symbol))
}

/// `deserialize_with` adapter for an optional price map field.
pub fn opt_price_map<'de, D>(d: D) -> Result<Option<PriceMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(v.as_ref().map(price_map))
}
