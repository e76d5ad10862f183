//! folio-host
//!
//! Controller side: spawns the tool worker, reads its startup line, performs
//! tool calls one at a time and turns the results into console text and a
//! JSON run report.

pub mod artifacts;
pub mod client;
pub mod payload;
pub mod process;
pub mod report;
pub mod scenario_args;

pub use client::WorkerClient;
pub use process::{spawn_stderr_drain, WorkerProcess};
