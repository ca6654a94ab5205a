//! Capability domain
//!
//! Named, schema-typed, side-effecting operations exposed to LLM backends
//! as callable tools.

pub mod entities;
pub mod traits;
pub mod value_objects;

pub use entities::{
    CapabilityCatalog, CapabilityDefinition, CapabilityParameter, ParamType, RiskLevel,
    ToolCallRequest, function_name,
};
pub use traits::{CapabilityValidator, DefaultCapabilityValidator};
pub use value_objects::{
    ToolExecutionResult, ToolFailure, ToolFailureKind, ToolFailureRecord, ToolOutcome, codes,
};
