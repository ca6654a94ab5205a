//! Local capability runtime.
//!
//! [`LocalCapabilityRuntime`] executes `tracker.*` calls over HTTP and
//! `vault.*` calls on the local filesystem. Every call is looked up in the
//! catalogue and validated before dispatch, and always yields exactly one
//! [`ToolExecutionResult`].

use super::catalog::{self, default_catalog};
use super::tracker::TrackerClient;
use super::vault::VaultFs;
use async_trait::async_trait;
use dbrain_application::ports::capability_runtime::CapabilityRuntime;
use dbrain_domain::{
    CapabilityCatalog, CapabilityValidator, DefaultCapabilityValidator, ToolCallRequest,
    ToolExecutionResult, ToolFailure,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct LocalCapabilityRuntime {
    catalog: CapabilityCatalog,
    vault: VaultFs,
    tracker: TrackerClient,
}

impl LocalCapabilityRuntime {
    /// Runtime over the full default catalogue
    pub fn new(vault_root: impl Into<PathBuf>, tracker: TrackerClient) -> Self {
        Self::with_catalog(default_catalog(), vault_root, tracker)
    }

    pub fn with_catalog(
        catalog: CapabilityCatalog,
        vault_root: impl Into<PathBuf>,
        tracker: TrackerClient,
    ) -> Self {
        Self {
            catalog,
            vault: VaultFs::new(vault_root),
            tracker,
        }
    }

    async fn dispatch(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        match call.capability.as_str() {
            catalog::TRACKER_USER_INFO => self.tracker.user_info(call).await,
            catalog::TRACKER_CREATE_TASK => self.tracker.create_task(call).await,
            catalog::TRACKER_LIST_TASKS => self.tracker.list_tasks(call).await,
            catalog::TRACKER_UPDATE_TASK => self.tracker.update_task(call).await,
            catalog::TRACKER_COMPLETE_TASK => self.tracker.complete_task(call).await,
            catalog::TRACKER_DELETE_TASK => self.tracker.delete_task(call).await,
            catalog::TRACKER_FIND_COMPLETED_TASKS => self.tracker.find_completed_tasks(call).await,
            catalog::VAULT_READ_FILE => self.vault.read_file(call),
            catalog::VAULT_WRITE_FILE => self.vault.write_file(call),
            catalog::VAULT_APPEND_FILE => self.vault.append_file(call),
            catalog::VAULT_LIST_FILES => self.vault.list_files(call),
            // Registered without a handler
            other => Err(ToolFailure::unsupported(other)),
        }
    }
}

#[async_trait]
impl CapabilityRuntime for LocalCapabilityRuntime {
    fn catalog(&self) -> &CapabilityCatalog {
        &self.catalog
    }

    async fn execute(&self, call: &ToolCallRequest) -> ToolExecutionResult {
        let capability = call.capability.as_str();

        let Some(definition) = self.catalog.get(capability) else {
            warn!(capability, "Unsupported capability requested");
            return ToolExecutionResult::failure(capability, ToolFailure::unsupported(capability));
        };

        if let Err(e) = DefaultCapabilityValidator.validate(call, definition) {
            warn!(capability, "Invalid capability arguments: {}", e);
            return ToolExecutionResult::failure(capability, ToolFailure::invalid_argument(e));
        }

        debug!(capability, mutating = definition.is_mutating(), "Executing capability");
        match self.dispatch(call).await {
            Ok(data) => {
                info!(capability, "Capability succeeded");
                ToolExecutionResult::success(capability, data)
            }
            Err(failure) => {
                warn!(capability, code = %failure.code, retryable = failure.retryable, "Capability failed: {}", failure.message);
                ToolExecutionResult::failure(capability, failure)
            }
        }
    }
}
