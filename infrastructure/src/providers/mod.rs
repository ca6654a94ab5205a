//! LLM provider adapters
//!
//! - [`claude_cli`]: shells out to the agent binary
//! - [`openai`]: drives a Chat Completions tool loop
//! - [`router`]: picks one of them from [`ProviderConfig`](dbrain_domain::ProviderConfig)

pub mod claude_cli;
pub mod openai;
pub mod router;

pub use claude_cli::ClaudeCliProvider;
pub use openai::OpenAiProvider;
pub use router::{ActiveProvider, ProviderRouter};
