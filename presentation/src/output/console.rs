//! Console output formatter for envelopes

use colored::Colorize;
use dbrain_domain::{LlmResponseEnvelope, Persistence};

/// Formats envelopes for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Status header, report or error, then tool failures and sync state.
    pub fn format(envelope: &LlmResponseEnvelope) -> String {
        let mut output = String::new();

        let provider = envelope.provider().label();
        let seconds = envelope.timings().total_seconds();
        match envelope.error_info() {
            Some(error) => {
                output.push_str(&format!(
                    "{} {} ({}, {:.1}s)\n\n",
                    "x".red().bold(),
                    error.kind.as_str().red().bold(),
                    provider,
                    seconds
                ));
                output.push_str(&error.message);
                output.push('\n');
            }
            None => {
                output.push_str(&format!(
                    "{} {} ({}, {:.1}s)\n\n",
                    "v".green().bold(),
                    "Done".green().bold(),
                    provider,
                    seconds
                ));
                output.push_str(envelope.report_text().unwrap_or_default());
                output.push('\n');
            }
        }

        if !envelope.tool_failures().is_empty() {
            output.push_str(&format!("\n{}\n", "Tool failures:".yellow().bold()));
            for record in envelope.tool_failures() {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    "-".yellow(),
                    record.capability.bold(),
                    record.error
                ));
            }
        }

        match envelope.persistence() {
            Persistence::NotAttempted => {}
            Persistence::Committed => {
                output.push_str(&format!("\n{} vault committed and pushed\n", "v".green()));
            }
            Persistence::NoChanges => {
                output.push_str(&format!("\n{}\n", "vault unchanged".dimmed()));
            }
            Persistence::Failed(reason) => {
                output.push_str(&format!(
                    "\n{} vault sync failed: {}\n",
                    "!".yellow().bold(),
                    reason
                ));
            }
        }

        output
    }
}
