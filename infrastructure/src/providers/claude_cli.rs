//! CLI-driven provider adapter.
//!
//! Runs the agent binary once per prompt:
//!
//! ```text
//! <binary> --print --dangerously-skip-permissions [--mcp-config <path>] -p <prompt>
//! ```
//!
//! The binary reaches the tracker through its own MCP servers, so no tool
//! calls pass through the capability runtime on this path and
//! `tool_failures` stays empty.

use async_trait::async_trait;
use dbrain_application::ports::llm_provider::{
    LlmProvider, ProviderError, ProviderOutput, ProviderRequest,
};
use dbrain_domain::util::truncate_str;
use dbrain_domain::{ClaudeCliConfig, ProviderKind, ResponseMeta};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Stderr kept in error messages
const MAX_STDERR_IN_ERROR: usize = 1000;

#[derive(Debug, Clone)]
pub struct ClaudeCliProvider {
    config: ClaudeCliConfig,
}

impl ClaudeCliProvider {
    pub fn new(config: ClaudeCliConfig) -> Self {
        Self { config }
    }

    fn command(&self, request: &ProviderRequest) -> Command {
        let mut cmd = Command::new(self.config.binary());
        cmd.arg("--print").arg("--dangerously-skip-permissions");
        if let Some(mcp) = self.config.mcp_config() {
            cmd.arg("--mcp-config").arg(mcp);
        }
        cmd.arg("-p").arg(&request.prompt);

        cmd.current_dir(self.config.workdir());

        if let Some(key) = self.config.tracker_api_key() {
            cmd.env("TODOIST_API_KEY", key);
        }

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: the child gets SIGTERM when this process dies, even on SIGKILL.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[async_trait]
impl LlmProvider for ClaudeCliProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ClaudeCli
    }

    async fn run(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        if let Some(mcp) = self.config.mcp_config()
            && !mcp.exists()
        {
            return Err(ProviderError::unavailable(format!(
                "MCP config not found: {}",
                mcp.display()
            )));
        }

        let started = Instant::now();
        let mut child = self.command(request).spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProviderError::unavailable(format!(
                    "Claude CLI not installed: {}",
                    self.config.binary().display()
                ))
            } else {
                ProviderError::unavailable(format!("Failed to start Claude CLI: {}", e))
            }
        })?;
        debug!(pid = ?child.id(), "Claude CLI started");

        let stdout = tokio::spawn(read_all(child.stdout.take()));
        let stderr = tokio::spawn(read_all(child.stderr.take()));

        let status = match tokio::time::timeout(request.timeout, child.wait()).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                return Err(ProviderError::unavailable(format!(
                    "Failed to wait for Claude CLI: {}",
                    e
                )));
            }
            Err(_) => {
                warn!(timeout_secs = request.timeout.as_secs(), "Claude CLI timed out, killing");
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill Claude CLI: {}", e);
                }
                stdout.abort();
                stderr.abort();
                return Err(ProviderError::timeout(request.timeout));
            }
        };

        let stdout = stdout.await.unwrap_or_default();
        let stderr = stderr.await.unwrap_or_default();
        let exit_code = status.code();
        info!(
            exit_code = ?exit_code,
            elapsed_ms = started.elapsed().as_millis() as u64,
            stdout_bytes = stdout.len(),
            "Claude CLI finished"
        );

        if !status.success() {
            let detail = stderr.trim();
            let detail = if detail.is_empty() { stdout.trim() } else { detail };
            return Err(ProviderError::unavailable(format!(
                "Claude CLI exited with {}: {}",
                exit_code.map_or_else(|| "signal".to_string(), |c| format!("code {}", c)),
                truncate_str(detail, MAX_STDERR_IN_ERROR)
            )));
        }

        Ok(ProviderOutput::new(stdout).with_meta(ResponseMeta {
            exit_code,
            ..Default::default()
        }))
    }
}
