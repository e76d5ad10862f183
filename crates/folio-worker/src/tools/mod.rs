//! Tool catalogue served by the worker.

mod analytics;
mod files;

use anyhow::Result;
use folio_config::WorkerSettings;
use folio_registry::ToolRegistry;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

pub use analytics::register_analytics_tools;
pub use files::{decode_text, register_file_tools};

/// Build the registry for one worker process. Called once at startup.
pub fn build_registry(settings: &WorkerSettings) -> Result<ToolRegistry> {
    let mut reg = ToolRegistry::new();
    register_analytics_tools(&mut reg, settings)?;
    if settings.enable_file_tools {
        register_file_tools(&mut reg)?;
    }
    Ok(reg)
}

/// Decode validated arguments into a typed struct.
pub(crate) fn decode_args<T: DeserializeOwned>(tool: &str, args: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(args.clone()))
        .map_err(|e| anyhow::anyhow!("{tool}: could not decode arguments: {e}"))
}
