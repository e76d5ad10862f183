//! Worker child process management.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::info;

use crate::client::WorkerClient;

/// tracing target for forwarded worker stderr lines.
pub const WORKER_STDERR_TARGET: &str = "folio_worker_stderr";

pub type ProcessClient = WorkerClient<BufReader<ChildStdout>, ChildStdin>;

pub struct WorkerProcess {
    child: Child,
    client: ProcessClient,
    stderr_drain: JoinHandle<()>,
}

/// Forward every stderr line to tracing until the stream closes.
///
/// Detached from the request/response stream: it never blocks a tool call
/// and its lines never reach protocol state.
pub fn spawn_stderr_drain<R>(stderr: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            info!(target: WORKER_STDERR_TARGET, "{line}");
        }
    })
}

impl WorkerProcess {
    /// Start the worker with piped stdio. The child is killed if this value
    /// is dropped without [`WorkerProcess::shutdown`].
    pub fn spawn(command: &str, args: &[String]) -> Result<Self> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn worker: {command}"))?;

        let stdin = child.stdin.take().context("worker stdin not piped")?;
        let stdout = child.stdout.take().context("worker stdout not piped")?;
        let stderr = child.stderr.take().context("worker stderr not piped")?;

        info!(command, pid = ?child.id(), "worker started");
        Ok(Self {
            child,
            client: WorkerClient::new(BufReader::new(stdout), stdin),
            stderr_drain: spawn_stderr_drain(stderr),
        })
    }

    pub fn client(&mut self) -> &mut ProcessClient {
        &mut self.client
    }

    /// Apply a response timeout to every subsequent call.
    pub fn with_timeout(self, timeout: std::time::Duration) -> Self {
        Self {
            client: self.client.with_timeout(timeout),
            ..self
        }
    }

    /// Close the worker's stdin (its EOF signal) and wait for it to exit.
    pub async fn shutdown(self) -> Result<ExitStatus> {
        let Self {
            mut child,
            client,
            stderr_drain,
        } = self;
        let (_stdout, stdin) = client.into_parts();
        drop(stdin);

        let status = child.wait().await.context("failed to wait for worker exit")?;
        // stderr closes with the process; let the drain flush what is left.
        let _ = stderr_drain.await;
        info!(%status, "worker exited");
        Ok(status)
    }
}
