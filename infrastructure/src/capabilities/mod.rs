//! Capability implementations
//!
//! - [`catalog`]: canonical capability definitions
//! - [`runtime`]: [`LocalCapabilityRuntime`], the validating dispatcher
//! - [`schema`]: function-calling schema conversion
//! - [`tracker`]: task tracker HTTP client
//! - [`vault`]: vault-confined filesystem operations

pub mod catalog;
pub mod runtime;
pub mod schema;
pub mod tracker;
pub mod vault;

pub use catalog::default_catalog;
pub use runtime::LocalCapabilityRuntime;
pub use schema::OpenAiToolSchema;
pub use tracker::{DEFAULT_TRACKER_BASE_URL, TrackerClient};
pub use vault::VaultFs;
