//! Tool schema conversion port.
//!
//! Separates "which capabilities exist" (domain) from "how to serialize them
//! for a function-calling API" (infrastructure).

use dbrain_domain::{CapabilityCatalog, CapabilityDefinition};

/// Port for converting capability definitions to function-calling tool schemas.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single capability to a `{"type": "function", ...}` tool entry.
    fn capability_to_schema(&self, capability: &CapabilityDefinition) -> serde_json::Value;

    /// Convert the whole catalogue, in registration order.
    fn all_tools_schema(&self, catalog: &CapabilityCatalog) -> Vec<serde_json::Value> {
        catalog
            .list()
            .iter()
            .map(|c| self.capability_to_schema(c))
            .collect()
    }
}
