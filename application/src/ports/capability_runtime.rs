//! Capability Runtime port
//!
//! Defines the interface for executing capabilities (tracker calls, vault
//! file operations) on behalf of a provider.

use async_trait::async_trait;
use dbrain_domain::{CapabilityCatalog, CapabilityDefinition, ToolCallRequest, ToolExecutionResult};

/// Port for capability execution
///
/// Implementations never panic or return transport errors: every request
/// yields exactly one [`ToolExecutionResult`], failures included.
#[async_trait]
pub trait CapabilityRuntime: Send + Sync {
    /// The catalogue this runtime validates against
    fn catalog(&self) -> &CapabilityCatalog;

    fn get_capability(&self, name: &str) -> Option<&CapabilityDefinition> {
        self.catalog().get(name)
    }

    /// Execute one capability call
    async fn execute(&self, request: &ToolCallRequest) -> ToolExecutionResult;
}
