//! Configuration file loading for dbrain
//!
//! Merges built-in defaults, the global and project config files, an
//! explicit `--config` file and `DBRAIN_*` environment variables with
//! figment, then converts the raw [`FileConfig`] into validated settings.

mod file_config;
mod loader;

pub use file_config::{
    DEFAULT_MCP_CONFIG_FILE, FileClaudeCliConfig, FileConfig, FileExecutionConfig,
    FileOpenAiConfig, FileProviderConfig, FileTrackerConfig, FileVaultConfig,
};
pub use loader::{ConfigLoader, ConfigSource, LoadError, LoadOptions};
