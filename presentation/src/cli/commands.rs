//! CLI command definitions

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for dbrain
#[derive(Parser, Debug)]
#[command(name = "dbrain")]
#[command(author, version, about = "Personal assistant automation over a note vault")]
#[command(long_about = r#"
dbrain hands a request to the configured LLM backend, lets it work on the
task tracker and the note vault, and commits the vault changes.

Configuration is loaded from (in priority order):
1. DBRAIN_* environment variables (e.g. DBRAIN_PROVIDER__NAME=openai)
2. --config <path>      Explicit config file
3. ./dbrain.toml        Project-level config
4. ~/.config/dbrain/config.toml   Global config

Example:
  dbrain daily
  dbrain daily --date 2026-02-10
  dbrain prompt "Move the dentist appointment to Friday" --user-id 42
  dbrain --provider openai weekly
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Override the provider (claude-cli, openai)
    #[arg(long, value_name = "NAME", global = true)]
    pub provider: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Print the legacy JSON map instead of formatted output
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress the progress spinner
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Process a daily note
    Daily {
        /// Day to process (YYYY-MM-DD, default today)
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },
    /// Execute an ad-hoc request
    Prompt {
        /// Request text
        text: String,

        /// Channel user id whose session log is included
        #[arg(long, value_name = "ID", default_value_t = 0)]
        user_id: u64,
    },
    /// Generate the weekly digest
    Weekly,
    /// Validate configuration and show where it came from
    CheckConfig,
}

impl Command {
    /// Short name for spinner and log lines
    pub fn label(&self) -> &'static str {
        match self {
            Command::Daily { .. } => "daily processing",
            Command::Prompt { .. } => "request",
            Command::Weekly => "weekly digest",
            Command::CheckConfig => "config check",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_daily_with_date() {
        let cli = Cli::try_parse_from(["dbrain", "daily", "--date", "2026-02-10"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Daily {
                date: NaiveDate::from_ymd_opt(2026, 2, 10)
            }
        );
        assert!(!cli.json);
    }

    #[test]
    fn test_parse_prompt_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "dbrain", "prompt", "buy milk", "--user-id", "42", "--provider", "openai", "-vv",
            "--json",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::Prompt {
                text: "buy milk".to_string(),
                user_id: 42
            }
        );
        assert_eq!(cli.provider.as_deref(), Some("openai"));
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["dbrain", "daily", "--date", "10/02/2026"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["dbrain"]).is_err());
        let cli = Cli::try_parse_from(["dbrain", "--no-config", "check-config"]).unwrap();
        assert_eq!(cli.command, Command::CheckConfig);
        assert!(cli.no_config);
    }
}
