//! Filesystem-backed vault notes
//!
//! Implements [`VaultNotes`] on top of [`VaultFs`] path resolution, so the
//! use cases are held to the same vault boundary as the LLM tool calls.

use crate::capabilities::VaultFs;
use chrono::NaiveDate;
use dbrain_application::ports::vault_notes::{NotesError, VaultNotes};
use dbrain_domain::SessionEntry;
use dbrain_domain::vault;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct FsVaultNotes {
    fs: VaultFs,
}

impl FsVaultNotes {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            fs: VaultFs::new(root),
        }
    }

    fn resolve(&self, relative: &Path) -> Result<PathBuf, NotesError> {
        self.fs
            .resolve(&relative.to_string_lossy())
            .map_err(|_| NotesError::OutsideVault(relative.to_path_buf()))
    }
}

impl VaultNotes for FsVaultNotes {
    fn root(&self) -> &Path {
        self.fs.root()
    }

    fn read(&self, relative: &Path) -> Result<Option<String>, NotesError> {
        let path = self.resolve(relative)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(NotesError::Io { path, source }),
        }
    }

    fn write(&self, relative: &Path, content: &str) -> Result<(), NotesError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| NotesError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, content).map_err(|source| NotesError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = content.len(), "Wrote vault note");
        Ok(())
    }

    fn exists(&self, relative: &Path) -> bool {
        self.resolve(relative).map(|p| p.is_file()).unwrap_or(false)
    }

    fn session_entries(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Vec<SessionEntry>, NotesError> {
        let Some(content) = self.read(&vault::session_log(user_id))? else {
            return Ok(Vec::new());
        };

        let mut skipped = 0usize;
        let entries: Vec<SessionEntry> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<SessionEntry>(line) {
                Ok(entry) => Some(entry),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .filter(|entry| entry.is_on(day))
            .collect();

        if skipped > 0 {
            warn!(user_id, skipped, "Skipped corrupt session log lines");
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_read_write_roundtrip_creates_parents() {
        let dir = TempDir::new().unwrap();
        let notes = FsVaultNotes::new(dir.path());

        assert_eq!(notes.read(Path::new("summaries/x.md")).unwrap(), None);
        assert!(!notes.exists(Path::new("summaries/x.md")));

        notes.write(Path::new("summaries/x.md"), "# Week").unwrap();
        assert!(notes.exists(Path::new("summaries/x.md")));
        assert_eq!(
            notes.read(Path::new("summaries/x.md")).unwrap().as_deref(),
            Some("# Week")
        );
    }

    #[test]
    fn test_rejects_paths_outside_vault() {
        let dir = TempDir::new().unwrap();
        let notes = FsVaultNotes::new(dir.path().join("vault"));

        assert!(matches!(
            notes.write(Path::new("../escape.md"), "x"),
            Err(NotesError::OutsideVault(_))
        ));
        assert!(!dir.path().join("escape.md").exists());
        assert!(!notes.exists(Path::new("/etc/passwd")));
    }

    #[test]
    fn test_directory_is_not_a_note() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("daily")).unwrap();
        let notes = FsVaultNotes::new(dir.path());

        assert!(!notes.exists(Path::new("daily")));
        assert!(matches!(
            notes.read(Path::new("daily")),
            Err(NotesError::Io { .. })
        ));
    }

    #[test]
    fn test_session_entries_filters_day_and_skips_corrupt_lines() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join(".sessions/42.jsonl");
        fs::create_dir_all(log.parent().unwrap()).unwrap();
        fs::write(
            &log,
            concat!(
                r#"{"ts": "2026-03-01T23:59:00", "type": "text", "text": "yesterday"}"#,
                "\n",
                r#"{"ts": "2026-03-02T08:00:00", "type": "voice", "text": "first"}"#,
                "\n",
                "{not json\n",
                "\n",
                r#"{"ts": "2026-03-02T09:30:00", "type": "text", "text": "second"}"#,
                "\n",
            ),
        )
        .unwrap();

        let notes = FsVaultNotes::new(dir.path());
        let entries = notes.session_entries(42, day(2026, 3, 2)).unwrap();
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);

        assert!(notes.session_entries(7, day(2026, 3, 2)).unwrap().is_empty());
    }
}
