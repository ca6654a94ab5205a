//! OpenAI-compatible Chat Completions provider
//!
//! - [`adapter`]: [`OpenAiProvider`] and its tool loop
//! - [`types`]: request/response wire types

pub mod adapter;
pub mod types;

pub use adapter::OpenAiProvider;
