//! LLM Provider port
//!
//! Defines the single contract every backend adapter implements, whether it
//! shells out to an agent binary or drives a function-calling loop itself.

use async_trait::async_trait;
use dbrain_domain::{ErrorKind, ProviderKind, ResponseMeta, ToolFailureRecord};
use std::time::Duration;
use thiserror::Error;

/// One prompt execution request.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub prompt: String,
    /// Wall-clock budget for the whole execution
    pub timeout: Duration,
    /// Upper bound on model turns (function-calling providers only)
    pub max_iterations: usize,
}

impl ProviderRequest {
    pub fn new(prompt: impl Into<String>, timeout: Duration, max_iterations: usize) -> Self {
        Self {
            prompt: prompt.into(),
            timeout,
            max_iterations,
        }
    }
}

/// Successful provider execution.
#[derive(Debug, Clone, Default)]
pub struct ProviderOutput {
    /// Final answer text (raw, unsanitized)
    pub text: String,
    /// Tool failures recovered during the run
    pub tool_failures: Vec<ToolFailureRecord>,
    pub meta: ResponseMeta,
}

impl ProviderOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_tool_failures(mut self, failures: Vec<ToolFailureRecord>) -> Self {
        self.tool_failures = failures;
        self
    }

    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = meta;
        self
    }
}

/// Terminal provider failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderErrorKind {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Execution timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("No final answer after {iterations} iterations")]
    NonConvergence { iterations: usize },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderErrorKind {
    /// Envelope error category for this failure
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ProviderErrorKind::Unavailable(_) => ErrorKind::ProviderUnavailable,
            ProviderErrorKind::Timeout(_) => ErrorKind::Timeout,
            ProviderErrorKind::NonConvergence { .. } => ErrorKind::NonConvergence,
            ProviderErrorKind::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }
}

/// Provider failure plus the tool failures accumulated before it happened.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub tool_failures: Vec<ToolFailureRecord>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind) -> Self {
        Self {
            kind,
            tool_failures: Vec::new(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable(message.into()))
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(ProviderErrorKind::Timeout(after))
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidResponse(message.into()))
    }

    pub fn with_tool_failures(mut self, failures: Vec<ToolFailureRecord>) -> Self {
        self.tool_failures = failures;
        self
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, ProviderErrorKind::Timeout(_))
    }
}

impl From<ProviderErrorKind> for ProviderError {
    fn from(kind: ProviderErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Port for LLM backends
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> ProviderKind;

    /// Execute a prompt to completion
    async fn run(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError>;
}
