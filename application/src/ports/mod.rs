//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod capability_runtime;
pub mod llm_provider;
pub mod tool_schema;
pub mod vault_notes;
pub mod vault_persistence;
