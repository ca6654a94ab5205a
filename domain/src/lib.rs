//! Domain layer for dbrain
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Capabilities
//!
//! Side-effecting operations (`tracker.*`, `vault.*`) that an LLM backend may
//! invoke. Each is described once by a [`CapabilityDefinition`] in the
//! [`CapabilityCatalog`]; every [`ToolCallRequest`] yields exactly one
//! [`ToolExecutionResult`].
//!
//! ## Envelope
//!
//! [`LlmResponseEnvelope`] is the single typed result of a use case. It holds
//! a report or an error, never both, and converts to a legacy key/value view.

pub mod capability;
pub mod core;
pub mod envelope;
pub mod prompt;
pub mod providers;
pub mod util;
pub mod vault;

// Re-export commonly used types
pub use capability::{
    CapabilityCatalog, CapabilityDefinition, CapabilityParameter, CapabilityValidator,
    DefaultCapabilityValidator, ParamType, RiskLevel, ToolCallRequest, ToolExecutionResult,
    ToolFailure, ToolFailureKind, ToolFailureRecord, ToolOutcome, codes, function_name,
};
pub use core::error::ConfigError;
pub use envelope::{
    EnvelopeError, EnvelopeOutcome, ErrorKind, LlmResponseEnvelope, Persistence, ResponseMeta,
    Timings, escape_html, sanitize_report,
};
pub use prompt::{PromptFlow, PromptTemplate, RequestContext};
pub use providers::{
    ClaudeCliConfig, DEFAULT_OPENAI_BASE_URL, OpenAiConfig, ProviderConfig, ProviderKind,
};
pub use vault::SessionEntry;
