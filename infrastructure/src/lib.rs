//! Infrastructure layer for dbrain
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod capabilities;
pub mod config;
pub mod notes;
pub mod providers;
pub mod vault_git;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use capabilities::{
    DEFAULT_TRACKER_BASE_URL, LocalCapabilityRuntime, OpenAiToolSchema, TrackerClient, VaultFs,
    default_catalog,
};
pub use config::{ConfigLoader, ConfigSource, FileConfig, LoadError, LoadOptions};
pub use notes::FsVaultNotes;
pub use providers::{ActiveProvider, ClaudeCliProvider, OpenAiProvider, ProviderRouter};
pub use vault_git::{VaultGit, VaultGitLock};
