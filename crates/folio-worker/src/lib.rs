//! folio-worker
//!
//! Tool worker process: builds the tool registry once, announces it on
//! stdout, then answers one JSON request per line until stdin closes.
//! stdout is the protocol channel; all diagnostics go to stderr.

pub mod dispatch;
pub mod tools;

pub use dispatch::{DispatchStats, Dispatcher};
pub use tools::build_registry;
