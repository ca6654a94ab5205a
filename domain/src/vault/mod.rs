//! Vault layout
//!
//! Relative locations of the files the use cases read and write, and the
//! session log record format. All paths are relative to the vault root.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SKILL_FILE: &str = ".claude/skills/dbrain-processor/SKILL.md";
pub const TRACKER_REFERENCE_FILE: &str = ".claude/skills/dbrain-processor/references/todoist.md";
pub const SESSIONS_DIR: &str = ".sessions";
pub const SUMMARIES_DIR: &str = "summaries";
pub const WEEKLY_MOC_FILE: &str = "MOC/MOC-weekly.md";
pub const PREVIOUS_WEEKS_HEADING: &str = "## Previous Weeks";

/// Number of session entries included in a prompt
pub const SESSION_CONTEXT_ENTRIES: usize = 10;

pub fn daily_note(day: NaiveDate) -> PathBuf {
    PathBuf::from("daily").join(format!("{}.md", day.format("%Y-%m-%d")))
}

pub fn session_log(user_id: u64) -> PathBuf {
    PathBuf::from(SESSIONS_DIR).join(format!("{}.jsonl", user_id))
}

/// ISO week label, e.g. `2026-W03`
pub fn iso_week_label(day: NaiveDate) -> String {
    let week = day.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Weekly summary file stem, e.g. `2026-W03-summary`
pub fn weekly_summary_stem(day: NaiveDate) -> String {
    format!("{}-summary", iso_week_label(day))
}

pub fn weekly_summary(day: NaiveDate) -> PathBuf {
    PathBuf::from(SUMMARIES_DIR).join(format!("{}.md", weekly_summary_stem(day)))
}

/// One line of `.sessions/<user_id>.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEntry {
    /// ISO-8601 timestamp
    #[serde(default)]
    pub ts: String,
    #[serde(rename = "type", default = "unknown_entry_type")]
    pub entry_type: String,
    #[serde(default)]
    pub text: String,
}

fn unknown_entry_type() -> String {
    "unknown".to_string()
}

impl SessionEntry {
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.ts.starts_with(&day.format("%Y-%m-%d").to_string())
    }

    /// `HH:MM` portion of the timestamp, empty when absent.
    pub fn time_of_day(&self) -> &str {
        self.ts.get(11..16).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_note_path() {
        assert_eq!(
            daily_note(day(2026, 1, 5)),
            PathBuf::from("daily/2026-01-05.md")
        );
    }

    #[test]
    fn test_weekly_summary_uses_iso_year() {
        // 2027-01-01 belongs to ISO week 53 of 2026
        assert_eq!(iso_week_label(day(2027, 1, 1)), "2026-W53");
        assert_eq!(
            weekly_summary(day(2026, 1, 14)),
            PathBuf::from("summaries/2026-W03-summary.md")
        );
    }

    #[test]
    fn test_session_entry_parsing() {
        let entry: SessionEntry = serde_json::from_str(
            r#"{"ts": "2026-03-02T09:15:00", "type": "voice", "text": "buy milk"}"#,
        )
        .unwrap();
        assert!(entry.is_on(day(2026, 3, 2)));
        assert!(!entry.is_on(day(2026, 3, 3)));
        assert_eq!(entry.time_of_day(), "09:15");

        let bare: SessionEntry = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert_eq!(bare.entry_type, "unknown");
        assert_eq!(bare.time_of_day(), "");
    }
}
