//! Request/response loop over line-delimited JSON.
//!
//! One startup line, then exactly one response line per non-blank request
//! line, in arrival order. Nothing a single line contains can stop the loop:
//! bad JSON, unknown tools, argument errors, failing or panicking tools all
//! become one error response. The loop ends only at EOF.

use std::any::Any;
use std::io::{BufRead, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

use anyhow::{anyhow, Context, Result};
use folio_registry::{InvokeError, ToolRegistry};
use folio_schemas::{encode_line, ServerMessage, ToolCall, REQUEST_TYPE_TOOL};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Counters reported when the input stream closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub requests: u64,
    pub errors: u64,
}

pub struct Dispatcher<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn initialized_message(&self) -> ServerMessage {
        ServerMessage::Initialized {
            tools: self.registry.descriptors(),
        }
    }

    /// Handle one input line. Blank lines produce no response.
    pub fn handle_line(&self, line: &str) -> Option<ServerMessage> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let resp = self.handle_request(line);
        if let ServerMessage::Error { error, .. } = &resp {
            warn!(error = %error, "request failed");
        }
        Some(resp)
    }

    fn handle_request(&self, line: &str) -> ServerMessage {
        let raw: Value = match serde_json::from_str(line).context("invalid JSON request") {
            Ok(v) => v,
            Err(e) => return traced(&e),
        };

        match raw.get("type") {
            None => return traced(&anyhow!("Request is missing a 'type' field")),
            Some(Value::String(t)) if t == REQUEST_TYPE_TOOL => {}
            Some(Value::String(t)) => return traced(&anyhow!("Unsupported request type: {t}")),
            Some(other) => return traced(&anyhow!("Unsupported request type: {other}")),
        }

        let call: ToolCall = match serde_json::from_value(raw).context("invalid tool request") {
            Ok(c) => c,
            Err(e) => return traced(&e),
        };

        debug!(tool = %call.name, "tool call");
        self.invoke(&call)
    }

    fn invoke(&self, call: &ToolCall) -> ServerMessage {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.registry.invoke(&call.name, &call.arguments)
        }));

        match outcome {
            Ok(Ok(result)) => ServerMessage::tool_result(call.name.clone(), result),
            // Plain message, no trace.
            Ok(Err(InvokeError::Unknown(e))) => ServerMessage::error(e.to_string()),
            Ok(Err(InvokeError::Arguments(e))) => traced(&anyhow::Error::new(e)),
            Ok(Err(InvokeError::Execution(e))) => traced(&e),
            Err(payload) => traced(&anyhow!(
                "tool '{}' panicked: {}",
                call.name,
                panic_message(payload.as_ref())
            )),
        }
    }

    /// Write the startup line, then serve requests until EOF.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<DispatchStats> {
        write_message(&mut output, &self.initialized_message())?;
        info!(tools = self.registry.len(), "worker ready");

        let mut stats = DispatchStats::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = input
                .read_until(b'\n', &mut buf)
                .context("failed to read request line")?;
            if n == 0 {
                break;
            }
            // Undecodable bytes still get a response (as invalid JSON).
            let line = String::from_utf8_lossy(&buf);
            if let Some(resp) = self.handle_line(&line) {
                stats.requests += 1;
                if resp.is_error() {
                    stats.errors += 1;
                }
                write_message(&mut output, &resp)?;
            }
        }

        info!(
            requests = stats.requests,
            errors = stats.errors,
            "input closed; worker exiting"
        );
        Ok(stats)
    }
}

fn traced(err: &anyhow::Error) -> ServerMessage {
    ServerMessage::error_with_trace(err.to_string(), format!("{err:?}"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn write_message<W: Write>(out: &mut W, msg: &ServerMessage) -> Result<()> {
    let line = encode_line(msg).context("failed to encode response")?;
    out.write_all(line.as_bytes())
        .and_then(|_| out.write_all(b"\n"))
        .and_then(|_| out.flush())
        .context("failed to write response line")
}
