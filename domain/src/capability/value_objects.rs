//! Capability value objects: immutable result and failure types
//!
//! These types form the **output side** of the capability pipeline. Every
//! [`ToolCallRequest`](super::entities::ToolCallRequest) produces exactly one
//! [`ToolExecutionResult`], whose outcome is either a JSON payload or a
//! structured [`ToolFailure`].
//!
//! Failures carry a coarse [`ToolFailureKind`] (what the caller branches on)
//! and a machine `code` (what the model and the logs see):
//!
//! | Kind | Codes |
//! |------|-------|
//! | `unsupported_capability` | `UNSUPPORTED_CAPABILITY` |
//! | `execution_failed` | `INVALID_ARGUMENT`, `AUTH_FAILED`, `MISSING_CREDENTIALS`, `HTTP_ERROR`, `TRANSPORT_ERROR`, `TIMEOUT`, `INVALID_RESPONSE`, `PATH_OUTSIDE_VAULT`, `IO_ERROR` |

use serde::{Deserialize, Serialize};

/// Machine-readable failure codes
pub mod codes {
    pub const UNSUPPORTED_CAPABILITY: &str = "UNSUPPORTED_CAPABILITY";
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const AUTH_FAILED: &str = "AUTH_FAILED";
    pub const MISSING_CREDENTIALS: &str = "MISSING_CREDENTIALS";
    pub const HTTP_ERROR: &str = "HTTP_ERROR";
    pub const TRANSPORT_ERROR: &str = "TRANSPORT_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
    pub const PATH_OUTSIDE_VAULT: &str = "PATH_OUTSIDE_VAULT";
    pub const IO_ERROR: &str = "IO_ERROR";
}

/// Coarse classification of a capability failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolFailureKind {
    /// No registered implementation for the requested name
    UnsupportedCapability,
    /// A registered capability's backend call or argument validation failed
    ExecutionFailed,
}

impl ToolFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolFailureKind::UnsupportedCapability => "unsupported_capability",
            ToolFailureKind::ExecutionFailed => "execution_failed",
        }
    }
}

impl std::fmt::Display for ToolFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured failure of a single capability execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ToolFailureKind,
    /// Error code (e.g., "AUTH_FAILED", "INVALID_ARGUMENT")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Whether repeating the same call may succeed
    #[serde(default)]
    pub retryable: bool,
    /// Additional details (e.g. truncated HTTP body)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ToolFailure {
    pub fn new(kind: ToolFailureKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            retryable: false,
            details: None,
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common constructors

    pub fn unsupported(capability: &str) -> Self {
        Self::new(
            ToolFailureKind::UnsupportedCapability,
            codes::UNSUPPORTED_CAPABILITY,
            format!("Unsupported capability: {}", capability),
        )
    }

    pub fn execution(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ToolFailureKind::ExecutionFailed, code, message)
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::execution(codes::INVALID_ARGUMENT, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::execution(codes::IO_ERROR, message)
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind == ToolFailureKind::UnsupportedCapability
    }
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if self.retryable {
            f.write_str(" (retryable)")?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolFailure {}

/// Tagged outcome of a capability execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { data: serde_json::Value },
    Failure { error: ToolFailure },
}

/// Result of executing exactly one [`ToolCallRequest`](super::entities::ToolCallRequest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    /// Name of the capability that was requested
    pub capability: String,
    pub outcome: ToolOutcome,
}

impl ToolExecutionResult {
    pub fn success(capability: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            capability: capability.into(),
            outcome: ToolOutcome::Success { data },
        }
    }

    pub fn failure(capability: impl Into<String>, error: ToolFailure) -> Self {
        Self {
            capability: capability.into(),
            outcome: ToolOutcome::Failure { error },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success { .. })
    }

    pub fn data(&self) -> Option<&serde_json::Value> {
        match &self.outcome {
            ToolOutcome::Success { data } => Some(data),
            ToolOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&ToolFailure> {
        match &self.outcome {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Failure { error } => Some(error),
        }
    }

    /// Record for the envelope's `tool_failures`, if this result failed.
    pub fn failure_record(&self) -> Option<ToolFailureRecord> {
        self.error().map(|error| ToolFailureRecord {
            capability: self.capability.clone(),
            error: error.clone(),
        })
    }

    /// JSON payload fed back to the model as the tool response.
    pub fn to_tool_message(&self) -> serde_json::Value {
        match &self.outcome {
            ToolOutcome::Success { data } => serde_json::json!({
                "ok": true,
                "data": data,
                "error": null,
            }),
            ToolOutcome::Failure { error } => serde_json::json!({
                "ok": false,
                "data": {},
                "error": error,
            }),
        }
    }
}

/// A failed tool call, as surfaced on the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolFailureRecord {
    pub capability: String,
    pub error: ToolFailure,
}

impl ToolFailureRecord {
    pub fn kind(&self) -> ToolFailureKind {
        self.error.kind
    }
}
