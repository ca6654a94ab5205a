//! Application-level configuration.
//!
//! - [`ExecutionParams`]: provider execution control (timeout, iteration budget)

pub mod execution_params;

pub use execution_params::{DEFAULT_MAX_ITERATIONS, DEFAULT_TIMEOUT, ExecutionParams};
