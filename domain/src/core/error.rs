//! Domain error types

use thiserror::Error;

/// Configuration errors
///
/// Raised while building a validated [`ProviderConfig`](crate::provider::ProviderConfig)
/// or execution settings. Always fatal at startup.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown provider '{0}' (expected one of: claude-cli, openai)")]
    UnknownProvider(String),

    #[error("Provider '{provider}' requires {field} ({hint})")]
    MissingField {
        provider: String,
        field: String,
        hint: String,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("CLI binary '{0}' not found on PATH")]
    BinaryNotFound(String),
}

impl ConfigError {
    pub fn missing(
        provider: impl Into<String>,
        field: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingField {
            provider: provider.into(),
            field: field.into(),
            hint: hint.into(),
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let error = ConfigError::missing("openai", "api key", "set OPENAI_API_KEY");
        assert_eq!(
            error.to_string(),
            "Provider 'openai' requires api key (set OPENAI_API_KEY)"
        );
    }

    #[test]
    fn test_unknown_provider_display() {
        let error = ConfigError::UnknownProvider("gemini".to_string());
        assert!(error.to_string().contains("'gemini'"));
        assert!(error.to_string().contains("claude-cli, openai"));
    }
}
