//! Envelope output formatting

pub mod console;
pub mod legacy;
