//! Command-line scenario tokens.
//!
//! `-5%` is a percentage move (pct = -0.05); a bare number such as `2` or
//! `+2` is an absolute price shift (delta). The label is the token itself.

use anyhow::{Context, Result};
use folio_analytics::ScenarioSpec;

pub fn parse_scenario_spec(raw: &str) -> Result<Option<ScenarioSpec>> {
    let token = raw.trim();
    if token.is_empty() {
        return Ok(None);
    }

    let (pct, delta) = match token.strip_suffix('%') {
        Some(num) => {
            let x: f64 = num
                .trim()
                .parse()
                .with_context(|| format!("invalid scenario percentage: {token}"))?;
            (x / 100.0, 0.0)
        }
        None => {
            let x: f64 = token
                .parse()
                .with_context(|| format!("invalid scenario price delta: {token}"))?;
            (0.0, x)
        }
    };
    if !pct.is_finite() || !delta.is_finite() {
        anyhow::bail!("invalid scenario value: {token}");
    }

    Ok(Some(ScenarioSpec::new(Some(token.to_string()), pct, delta)))
}

/// Parse every token in order, skipping blanks.
pub fn parse_scenario_specs<S: AsRef<str>>(values: &[S]) -> Result<Vec<ScenarioSpec>> {
    let mut specs = Vec::with_capacity(values.len());
    for v in values {
        if let Some(spec) = parse_scenario_spec(v.as_ref())? {
            specs.push(spec);
        }
    }
    Ok(specs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_and_delta_tokens() {
        let specs = parse_scenario_specs(&["-5%", " +5% ", "2", "-1.5", ""]).unwrap();
        let got: Vec<(&str, f64, f64)> = specs
            .iter()
            .map(|s| (s.label.as_str(), s.pct, s.delta))
            .collect();
        assert_eq!(
            got,
            vec![
                ("-5%", -0.05, 0.0),
                ("+5%", 0.05, 0.0),
                ("2", 0.0, 2.0),
                ("-1.5", 0.0, -1.5),
            ]
        );
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert!(parse_scenario_specs(&["five%"]).is_err());
        assert!(parse_scenario_specs(&["%"]).is_err());
        assert!(parse_scenario_specs(&["inf"]).is_err());
    }

    #[test]
    fn blank_input_yields_nothing() {
        let none: [&str; 0] = [];
        assert!(parse_scenario_specs(&none).unwrap().is_empty());
        assert!(parse_scenario_specs(&["  "]).unwrap().is_empty());
    }
}
