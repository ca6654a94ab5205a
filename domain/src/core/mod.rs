//! Core domain concepts shared across all subdomains.
//!
//! - [`error::ConfigError`]: configuration validation errors

pub mod error;
