//! Prompt domain
//!
//! Templates for the prompts each use case sends to the active provider.

mod template;

pub use template::{PromptFlow, PromptTemplate, RequestContext};
