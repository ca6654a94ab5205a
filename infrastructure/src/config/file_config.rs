//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout one to one. Nothing here is
//! validated; [`FileConfig::provider_config`] and friends turn the raw values
//! into the checked domain types.

use crate::capabilities::{DEFAULT_TRACKER_BASE_URL, TrackerClient};
use dbrain_application::ExecutionParams;
use dbrain_application::config::execution_params::{DEFAULT_MAX_ITERATIONS, DEFAULT_TIMEOUT};
use dbrain_domain::{
    ClaudeCliConfig, ConfigError, DEFAULT_OPENAI_BASE_URL, OpenAiConfig, ProviderConfig,
    ProviderKind,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name the CLI adapter looks for next to the vault
pub const DEFAULT_MCP_CONFIG_FILE: &str = "mcp-config.json";

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub provider: FileProviderConfig,
    pub vault: FileVaultConfig,
    pub tracker: FileTrackerConfig,
    pub execution: FileExecutionConfig,
}

/// `[provider]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// `claude-cli` or `openai` (alias `openai-api`)
    pub name: String,
    pub claude_cli: FileClaudeCliConfig,
    pub openai: FileOpenAiConfig,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderKind::ClaudeCli.as_str().to_string(),
            claude_cli: FileClaudeCliConfig::default(),
            openai: FileOpenAiConfig::default(),
        }
    }
}

/// `[provider.claude_cli]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileClaudeCliConfig {
    /// Binary name (looked up on PATH) or path
    pub binary: String,
    /// Working directory; defaults to the vault's parent
    pub workdir: Option<PathBuf>,
    /// MCP config; defaults to `<workdir>/mcp-config.json`
    pub mcp_config: Option<PathBuf>,
}

impl Default for FileClaudeCliConfig {
    fn default() -> Self {
        Self {
            binary: "claude".to_string(),
            workdir: None,
            mcp_config: None,
        }
    }
}

/// `[provider.openai]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenAiConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (prefer the env var)
    pub api_key: Option<String>,
    /// Environment variable holding the model name
    pub model_env: String,
    pub model: Option<String>,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for FileOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            model_env: "OPENAI_MODEL".to_string(),
            model: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            temperature: 0.0,
        }
    }
}

/// `[vault]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVaultConfig {
    pub path: PathBuf,
}

impl Default for FileVaultConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./vault"),
        }
    }
}

/// `[tracker]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTrackerConfig {
    pub api_key_env: String,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FileTrackerConfig {
    fn default() -> Self {
        Self {
            api_key_env: "TODOIST_API_KEY".to_string(),
            api_key: None,
            base_url: DEFAULT_TRACKER_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

/// `[execution]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExecutionConfig {
    pub timeout_secs: u64,
    pub max_iterations: usize,
}

impl Default for FileExecutionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Direct value first, then the named environment variable; blanks count as unset.
fn secret(direct: &Option<String>, env_name: &str) -> Option<String> {
    direct
        .clone()
        .or_else(|| std::env::var(env_name).ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FileConfig {
    /// Absolute vault root
    pub fn vault_root(&self) -> PathBuf {
        std::path::absolute(&self.vault.path).unwrap_or_else(|_| self.vault.path.clone())
    }

    pub fn tracker_api_key(&self) -> Option<String> {
        secret(&self.tracker.api_key, &self.tracker.api_key_env)
    }

    pub fn tracker_client(&self) -> TrackerClient {
        TrackerClient::with_timeout(
            self.tracker_api_key(),
            &self.tracker.base_url,
            Duration::from_secs(self.tracker.timeout_secs.max(1)),
        )
    }

    pub fn execution_params(&self) -> Result<ExecutionParams, ConfigError> {
        if self.execution.timeout_secs == 0 {
            return Err(ConfigError::invalid("execution.timeout_secs", "cannot be 0"));
        }
        if self.execution.max_iterations == 0 {
            return Err(ConfigError::invalid("execution.max_iterations", "cannot be 0"));
        }
        Ok(ExecutionParams::default()
            .with_timeout(Duration::from_secs(self.execution.timeout_secs))
            .with_max_iterations(self.execution.max_iterations))
    }

    /// Validated provider selection.
    ///
    /// Unknown names, a missing API key or model, a malformed base URL, an
    /// OpenAI provider without a tracker key and a CLI binary absent from
    /// PATH are all rejected here.
    pub fn provider_config(&self) -> Result<ProviderConfig, ConfigError> {
        match self.provider.name.parse::<ProviderKind>()? {
            ProviderKind::ClaudeCli => {
                let cli = &self.provider.claude_cli;
                let binary = which::which(&cli.binary)
                    .map_err(|_| ConfigError::BinaryNotFound(cli.binary.clone()))?;
                let workdir = cli.workdir.clone().unwrap_or_else(|| self.default_workdir());
                let mcp_config = Some(
                    cli.mcp_config
                        .clone()
                        .unwrap_or_else(|| workdir.join(DEFAULT_MCP_CONFIG_FILE)),
                );
                Ok(ProviderConfig::ClaudeCli(ClaudeCliConfig::new(
                    binary,
                    workdir,
                    mcp_config,
                    self.tracker_api_key(),
                )?))
            }
            ProviderKind::OpenAi => {
                let openai = &self.provider.openai;
                let config = OpenAiConfig::new(
                    secret(&openai.api_key, &openai.api_key_env),
                    secret(&openai.model, &openai.model_env),
                    &openai.base_url,
                    openai.temperature,
                )?;
                if self.tracker_api_key().is_none() {
                    return Err(ConfigError::missing(
                        "openai",
                        "tracker api key",
                        format!("set {}", self.tracker.api_key_env),
                    ));
                }
                Ok(ProviderConfig::OpenAi(config))
            }
        }
    }

    fn default_workdir(&self) -> PathBuf {
        let root = self.vault_root();
        root.parent()
            .map(Path::to_path_buf)
            .unwrap_or(root)
    }
}
