//! Provider router
//!
//! A pure factory over the closed set of adapters. Provider names and
//! credentials are validated when [`ProviderConfig`] is built, so routing
//! itself cannot fail and never falls back to another provider.

use super::claude_cli::ClaudeCliProvider;
use super::openai::OpenAiProvider;
use async_trait::async_trait;
use dbrain_application::ports::capability_runtime::CapabilityRuntime;
use dbrain_application::ports::llm_provider::{
    LlmProvider, ProviderError, ProviderOutput, ProviderRequest,
};
use dbrain_domain::{ProviderConfig, ProviderKind};
use std::sync::Arc;
use tracing::info;

/// The adapter selected for this process
pub enum ActiveProvider {
    ClaudeCli(ClaudeCliProvider),
    OpenAi(OpenAiProvider),
}

impl ActiveProvider {
    /// Human-readable name for channel messages
    pub fn label(&self) -> &'static str {
        self.kind().label()
    }
}

#[async_trait]
impl LlmProvider for ActiveProvider {
    fn kind(&self) -> ProviderKind {
        match self {
            ActiveProvider::ClaudeCli(p) => p.kind(),
            ActiveProvider::OpenAi(p) => p.kind(),
        }
    }

    async fn run(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        match self {
            ActiveProvider::ClaudeCli(p) => p.run(request).await,
            ActiveProvider::OpenAi(p) => p.run(request).await,
        }
    }
}

pub struct ProviderRouter;

impl ProviderRouter {
    /// Build the adapter for `config`.
    ///
    /// The capability runtime is only wired into function-calling adapters;
    /// the CLI adapter reaches its tools through MCP.
    pub fn create(config: &ProviderConfig, runtime: Arc<dyn CapabilityRuntime>) -> ActiveProvider {
        let provider = match config {
            ProviderConfig::ClaudeCli(cli) => {
                ActiveProvider::ClaudeCli(ClaudeCliProvider::new(cli.clone()))
            }
            ProviderConfig::OpenAi(openai) => {
                ActiveProvider::OpenAi(OpenAiProvider::new(openai.clone(), runtime))
            }
        };
        info!(provider = %provider.kind(), "Selected LLM provider");
        provider
    }
}
