use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed view of the merged configuration. Every field has a default, so an
/// empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub worker: WorkerSettings,
    pub host: HostSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Used when a tool call omits `fee_rate`.
    pub default_fee_rate: f64,
    /// Used when `analyze_portfolio_quality` omits `max_abs_qty`.
    pub max_abs_qty: f64,
    /// Registers `read_file` / `list_files`.
    pub enable_file_tools: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            default_fee_rate: 0.0,
            max_abs_qty: 1_000_000.0,
            enable_file_tools: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSettings {
    pub worker_command: String,
    pub worker_args: Vec<String>,
    pub call_timeout_secs: u64,
    /// Scenario tokens used when none are passed on the command line.
    pub default_scenarios: Vec<String>,
    pub exports_dir: String,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            worker_command: "folio-worker".to_string(),
            worker_args: Vec::new(),
            call_timeout_secs: 30,
            default_scenarios: vec!["-5%".to_string(), "+5%".to_string()],
            exports_dir: "exports".to_string(),
        }
    }
}

impl FolioConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: FolioConfig = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: config does not match the expected shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let fee = self.worker.default_fee_rate;
        if !fee.is_finite() || !(0.0..1.0).contains(&fee) {
            bail!("CONFIG_INVALID worker.default_fee_rate={fee} must be in [0, 1)");
        }
        let max = self.worker.max_abs_qty;
        if !max.is_finite() || max <= 0.0 {
            bail!("CONFIG_INVALID worker.max_abs_qty={max} must be > 0");
        }
        if self.host.call_timeout_secs == 0 {
            bail!("CONFIG_INVALID host.call_timeout_secs must be > 0");
        }
        if self.host.worker_command.trim().is_empty() {
            bail!("CONFIG_INVALID host.worker_command must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = FolioConfig::from_json(&json!({})).unwrap();
        assert_eq!(cfg, FolioConfig::default());
        assert_eq!(cfg.worker.max_abs_qty, 1_000_000.0);
        assert_eq!(cfg.host.default_scenarios, vec!["-5%", "+5%"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = FolioConfig::from_json(&json!({"worker": {"default_fee_rate": 0.001}})).unwrap();
        assert_eq!(cfg.worker.default_fee_rate, 0.001);
        assert!(cfg.worker.enable_file_tools);
        assert_eq!(cfg.host.call_timeout_secs, 30);
    }

    #[test]
    fn fee_rate_of_one_is_rejected() {
        let err =
            FolioConfig::from_json(&json!({"worker": {"default_fee_rate": 1.0}})).unwrap_err();
        assert!(err.to_string().starts_with("CONFIG_INVALID"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(FolioConfig::from_json(&json!({"host": {"call_timeout_secs": 0}})).is_err());
    }

    #[test]
    fn wrong_shape_is_config_invalid() {
        let err = FolioConfig::from_json(&json!({"worker": {"max_abs_qty": "lots"}})).unwrap_err();
        assert!(format!("{err:#}").contains("CONFIG_INVALID"));
    }
}
