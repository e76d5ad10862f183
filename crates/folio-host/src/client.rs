//! Controller side of the line protocol.
//!
//! Strictly one call in flight: write one request line, flush, read one
//! response line. Works over any async reader/writer pair so tests can use an
//! in-memory duplex instead of a child process.
//!
//! A call that fails mid-exchange (timeout, write error, EOF) leaves a
//! request without a consumed response, so the client refuses further calls.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use folio_schemas::{encode_line, ServerMessage, ToolCall, ToolDescriptor};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

pub struct WorkerClient<R, W> {
    reader: R,
    writer: W,
    timeout: Option<Duration>,
    poisoned: bool,
}

impl<R, W> WorkerClient<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            timeout: None,
            poisoned: false,
        }
    }

    /// Bound every response read (including the startup line).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// True once an exchange failed and the stream can no longer be trusted.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Read the startup line. It must be `mcp_initialized`.
    pub async fn read_initialized(&mut self) -> Result<Vec<ToolDescriptor>> {
        self.ensure_in_sync("mcp_initialized")?;
        self.poisoned = true;
        let msg = self
            .read_message()
            .await
            .context("failed to read worker startup line")?;
        self.poisoned = false;
        match msg {
            ServerMessage::Initialized { tools } => Ok(tools),
            other => bail!("expected mcp_initialized as first worker line, got {other:?}"),
        }
    }

    /// Send one request and wait for its response.
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<ServerMessage> {
        self.ensure_in_sync(name)?;
        let line =
            encode_line(&ToolCall::new(name, arguments)).context("failed to encode request")?;

        // Cleared only once the matching response line has been read.
        self.poisoned = true;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer
            .flush()
            .await
            .with_context(|| format!("failed to send request for tool {name}"))?;

        let msg = self
            .read_message()
            .await
            .with_context(|| format!("no response for tool {name}"))?;
        self.poisoned = false;
        Ok(msg)
    }

    /// Like [`Self::call_tool`], but an error response becomes `Err` and the
    /// result must name the requested tool.
    pub async fn call_tool_result(&mut self, name: &str, arguments: Value) -> Result<Value> {
        match self.call_tool(name, arguments).await? {
            ServerMessage::ToolResult { name: got, result } => {
                if got != name {
                    self.poisoned = true;
                    bail!("response for tool {got} received while waiting for {name}");
                }
                Ok(result)
            }
            ServerMessage::Error { error, .. } => Err(anyhow!("tool {name} failed: {error}")),
            ServerMessage::Initialized { .. } => {
                bail!("unexpected mcp_initialized in response to {name}")
            }
        }
    }

    fn ensure_in_sync(&self, name: &str) -> Result<()> {
        if self.poisoned {
            bail!("worker stream out of sync after an earlier failed call; refusing {name}");
        }
        Ok(())
    }

    async fn read_message(&mut self) -> Result<ServerMessage> {
        loop {
            let mut line = String::new();
            let n = match self.timeout {
                Some(t) => tokio::time::timeout(t, self.reader.read_line(&mut line))
                    .await
                    .map_err(|_| anyhow!("timed out after {t:?} waiting for worker"))??,
                None => self.reader.read_line(&mut line).await?,
            };
            if n == 0 {
                bail!("worker closed its output stream");
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return serde_json::from_str(line)
                .with_context(|| format!("invalid worker response line: {line}"));
        }
    }
}
