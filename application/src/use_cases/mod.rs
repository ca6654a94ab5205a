//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod daily_processing;
pub mod execute_prompt;
pub mod processor;
pub(crate) mod shared;
pub mod weekly_digest;
