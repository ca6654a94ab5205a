//! Response envelope shared by every use case

use crate::capability::ToolFailureRecord;
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error categories surfaced on an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Backend could not be reached or exited unsuccessfully
    ProviderUnavailable,
    /// Wall-clock budget exceeded
    Timeout,
    /// Tool loop hit its iteration budget without a final answer
    NonConvergence,
    /// Backend answered with something unparseable
    InvalidResponse,
    /// A required vault input was absent
    MissingInput,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ProviderUnavailable => "provider_unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::NonConvergence => "non_convergence",
            ErrorKind::InvalidResponse => "invalid_response",
            ErrorKind::MissingInput => "missing_input",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Report XOR error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeOutcome {
    Report(String),
    Error(EnvelopeError),
}

/// Result of the vault commit step
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Persistence {
    #[default]
    NotAttempted,
    Committed,
    NoChanges,
    Failed(String),
}

impl Persistence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persistence::NotAttempted => "not_attempted",
            Persistence::Committed => "committed",
            Persistence::NoChanges => "no_changes",
            Persistence::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Persistence::Failed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Timings {
    #[serde(with = "duration_secs")]
    pub total: Duration,
}

impl Timings {
    pub fn new(total: Duration) -> Self {
        Self { total }
    }

    /// Total seconds rounded to milliseconds
    pub fn total_seconds(&self) -> f64 {
        (self.total.as_secs_f64() * 1000.0).round() / 1000.0
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Provider-reported metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponseMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u32>,
}

/// Typed result of a use case.
///
/// Holds exactly one of a report or an error. There are no mutating methods:
/// the `with_*` builders consume the envelope and return a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponseEnvelope {
    outcome: EnvelopeOutcome,
    provider: ProviderKind,
    processed_entries: u32,
    timings: Timings,
    tool_failures: Vec<ToolFailureRecord>,
    persistence: Persistence,
    meta: ResponseMeta,
}

impl LlmResponseEnvelope {
    pub fn report(provider: ProviderKind, report: impl Into<String>) -> Self {
        Self::with_outcome(provider, EnvelopeOutcome::Report(report.into()))
    }

    pub fn error(provider: ProviderKind, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::with_outcome(
            provider,
            EnvelopeOutcome::Error(EnvelopeError {
                kind,
                message: message.into(),
            }),
        )
    }

    fn with_outcome(provider: ProviderKind, outcome: EnvelopeOutcome) -> Self {
        Self {
            outcome,
            provider,
            processed_entries: 0,
            timings: Timings::default(),
            tool_failures: Vec::new(),
            persistence: Persistence::NotAttempted,
            meta: ResponseMeta::default(),
        }
    }

    pub fn with_processed_entries(mut self, count: u32) -> Self {
        self.processed_entries = count;
        self
    }

    pub fn with_elapsed(mut self, total: Duration) -> Self {
        self.timings = Timings::new(total);
        self
    }

    pub fn with_tool_failures(mut self, failures: Vec<ToolFailureRecord>) -> Self {
        self.tool_failures = failures;
        self
    }

    pub fn with_persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_meta(mut self, meta: ResponseMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn outcome(&self) -> &EnvelopeOutcome {
        &self.outcome
    }

    pub fn report_text(&self) -> Option<&str> {
        match &self.outcome {
            EnvelopeOutcome::Report(text) => Some(text),
            EnvelopeOutcome::Error(_) => None,
        }
    }

    pub fn error_info(&self) -> Option<&EnvelopeError> {
        match &self.outcome {
            EnvelopeOutcome::Report(_) => None,
            EnvelopeOutcome::Error(error) => Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, EnvelopeOutcome::Error(_))
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn processed_entries(&self) -> u32 {
        self.processed_entries
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn tool_failures(&self) -> &[ToolFailureRecord] {
        &self.tool_failures
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn meta(&self) -> &ResponseMeta {
        &self.meta
    }

    /// Flat key/value view consumed by older formatters.
    ///
    /// Always carries `processed_entries`, `provider` and `timings`. Exactly
    /// one of `report` or `error` (plus `error_kind`) is present.
    /// `tool_failures` and `persistence` appear only when they say something.
    pub fn to_legacy_map(&self) -> serde_json::Map<String, serde_json::Value> {
        use serde_json::{Value, json};

        let mut map = serde_json::Map::new();
        map.insert("processed_entries".into(), json!(self.processed_entries));
        map.insert("provider".into(), json!(self.provider.as_str()));
        map.insert(
            "timings".into(),
            json!({ "total_seconds": self.timings.total_seconds() }),
        );

        match &self.outcome {
            EnvelopeOutcome::Report(text) => {
                map.insert("report".into(), Value::String(text.clone()));
            }
            EnvelopeOutcome::Error(error) => {
                map.insert("error".into(), Value::String(error.message.clone()));
                map.insert("error_kind".into(), json!(error.kind.as_str()));
            }
        }

        if !self.tool_failures.is_empty() {
            let failures = self
                .tool_failures
                .iter()
                .map(|record| {
                    json!({
                        "capability": record.capability,
                        "kind": record.error.kind.as_str(),
                        "code": record.error.code,
                        "message": record.error.message,
                        "retryable": record.error.retryable,
                    })
                })
                .collect();
            map.insert("tool_failures".into(), Value::Array(failures));
        }

        if self.persistence != Persistence::NotAttempted {
            map.insert("persistence".into(), json!(self.persistence.as_str()));
            if let Persistence::Failed(message) = &self.persistence {
                map.insert("persistence_error".into(), json!(message));
            }
        }

        map
    }
}
