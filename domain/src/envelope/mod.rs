//! Response envelope domain
//!
//! The single typed result every use case returns, plus the sanitizer that
//! enforces the light-HTML delivery contract on reports.

pub mod entities;
pub mod report;

pub use entities::{
    EnvelopeError, EnvelopeOutcome, ErrorKind, LlmResponseEnvelope, Persistence, ResponseMeta,
    Timings,
};
pub use report::{escape_html, sanitize_report};
