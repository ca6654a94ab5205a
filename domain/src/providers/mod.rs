//! Provider selection types.
//!
//! [`ProviderConfig`] is the validated, immutable snapshot the router builds
//! an adapter from. It can only be obtained through the constructors on
//! [`ClaudeCliConfig`] and [`OpenAiConfig`], so an instance always describes
//! a runnable backend.

use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default OpenAI-compatible endpoint root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Closed set of supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// External agent binary with built-in tool use
    #[serde(rename = "claude-cli")]
    ClaudeCli,
    /// OpenAI-compatible chat completions API with function calling
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Canonical configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::ClaudeCli => "claude-cli",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// Human-readable label for channel messages
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::ClaudeCli => "Claude CLI",
            ProviderKind::OpenAi => "OpenAI API",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude-cli" | "claude" => Ok(ProviderKind::ClaudeCli),
            "openai" | "openai-api" => Ok(ProviderKind::OpenAi),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Settings for the CLI-driven adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaudeCliConfig {
    binary: PathBuf,
    workdir: PathBuf,
    mcp_config: Option<PathBuf>,
    tracker_api_key: Option<String>,
}

impl ClaudeCliConfig {
    /// Validate CLI adapter settings.
    ///
    /// `binary` must already be resolved (the infrastructure layer checks PATH).
    pub fn new(
        binary: impl Into<PathBuf>,
        workdir: impl Into<PathBuf>,
        mcp_config: Option<PathBuf>,
        tracker_api_key: Option<String>,
    ) -> Result<Self, ConfigError> {
        let binary = binary.into();
        let workdir = workdir.into();

        if binary.as_os_str().is_empty() {
            return Err(ConfigError::missing(
                ProviderKind::ClaudeCli.as_str(),
                "binary",
                "set provider.claude_cli.binary",
            ));
        }
        if workdir.as_os_str().is_empty() {
            return Err(ConfigError::missing(
                ProviderKind::ClaudeCli.as_str(),
                "working directory",
                "set vault.path or provider.claude_cli.workdir",
            ));
        }

        Ok(Self {
            binary,
            workdir,
            mcp_config,
            tracker_api_key: tracker_api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn mcp_config(&self) -> Option<&Path> {
        self.mcp_config.as_deref()
    }

    pub fn tracker_api_key(&self) -> Option<&str> {
        self.tracker_api_key.as_deref()
    }
}

/// Settings for the OpenAI-compatible adapter.
#[derive(Clone, PartialEq)]
pub struct OpenAiConfig {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl OpenAiConfig {
    /// Validate API adapter settings.
    ///
    /// Both the key and the model are mandatory. The base URL must be an
    /// absolute http(s) URL; a trailing slash is stripped.
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: &str,
        temperature: f32,
    ) -> Result<Self, ConfigError> {
        let provider = ProviderKind::OpenAi.as_str();

        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::missing(provider, "api key", "set OPENAI_API_KEY"))?;
        let model = model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                ConfigError::missing(provider, "model", "set provider.openai.model or OPENAI_MODEL")
            })?;

        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let host = base_url
            .strip_prefix("https://")
            .or_else(|| base_url.strip_prefix("http://"));
        match host {
            Some(rest) if !rest.is_empty() && !rest.starts_with('/') => {}
            _ => {
                return Err(ConfigError::invalid(
                    "provider.openai.base_url",
                    format!("'{}' is not an absolute http(s) URL", base_url),
                ));
            }
        }

        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::invalid(
                "provider.openai.temperature",
                format!("{} is outside 0.0..=2.0", temperature),
            ));
        }

        Ok(Self {
            api_key,
            model,
            base_url,
            temperature,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// `POST` target for chat completions
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Validated provider configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderConfig {
    ClaudeCli(ClaudeCliConfig),
    OpenAi(OpenAiConfig),
}

impl ProviderConfig {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderConfig::ClaudeCli(_) => ProviderKind::ClaudeCli,
            ProviderConfig::OpenAi(_) => ProviderKind::OpenAi,
        }
    }
}
