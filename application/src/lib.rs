//! Application layer for dbrain
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    capability_runtime::CapabilityRuntime,
    llm_provider::{LlmProvider, ProviderError, ProviderErrorKind, ProviderOutput, ProviderRequest},
    tool_schema::ToolSchemaPort,
    vault_notes::{NotesError, VaultNotes},
    vault_persistence::{CommitOutcome, VaultPersistence},
};
pub use use_cases::daily_processing::DailyProcessingUseCase;
pub use use_cases::execute_prompt::{ExecutePromptInput, ExecutePromptUseCase};
pub use use_cases::processor::{LegacyMap, LlmProcessor};
pub use use_cases::weekly_digest::WeeklyDigestUseCase;
