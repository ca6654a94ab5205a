//! Spinner shown while a use case runs in the background

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(120);

/// Foreground progress indicator
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Start spinning with `message`; hidden when `quiet`.
    pub fn start(message: &str, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
        };
        bar.set_style(Self::spinner_style());
        bar.set_message(message.to_string());
        if !quiet {
            bar.enable_steady_tick(TICK);
        }
        Self { bar }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn finish(&self, success: bool) {
        let mark = if success { "v".green() } else { "x".red() };
        self.bar
            .finish_with_message(format!("{} {}", mark, self.bar.message()));
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
