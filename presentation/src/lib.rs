//! Presentation layer for dbrain
//!
//! This crate contains CLI definitions, envelope formatters
//! and the progress spinner.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use output::console::ConsoleFormatter;
pub use output::legacy::format_json;
pub use progress::reporter::ProgressReporter;
