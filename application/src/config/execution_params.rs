//! Execution parameters for use case loop control.
//!
//! [`ExecutionParams`] groups the static parameters every use case hands to
//! the active provider. These are application-layer concerns, not domain
//! policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default wall-clock budget for one provider execution (20 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1200);

/// Default model-turn budget for function-calling providers.
pub const DEFAULT_MAX_ITERATIONS: usize = 8;

/// Execution control parameters.
///
/// | Provider | `timeout` | `max_iterations` |
/// |----------|-----------|------------------|
/// | claude-cli | child process deadline | ignored |
/// | openai | overall loop deadline | tool loop bound |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Wall-clock budget for one provider execution.
    pub timeout: Duration,
    /// Maximum model turns in the function-calling loop.
    pub max_iterations: usize,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}
