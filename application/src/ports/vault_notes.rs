//! Vault notes port
//!
//! Read/write access to the note files the use cases consume and produce.
//! Paths are relative to the vault root.

use chrono::NaiveDate;
use dbrain_domain::SessionEntry;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path escapes the vault: {0}")]
    OutsideVault(PathBuf),
}

/// Port for vault note access
pub trait VaultNotes: Send + Sync {
    /// Absolute vault root
    fn root(&self) -> &Path;

    /// Read a note; `Ok(None)` when it does not exist.
    fn read(&self, relative: &Path) -> Result<Option<String>, NotesError>;

    /// Create or replace a note, creating parent directories.
    fn write(&self, relative: &Path, content: &str) -> Result<(), NotesError>;

    fn exists(&self, relative: &Path) -> bool;

    /// Session log entries for `user_id` dated `day`, oldest first.
    ///
    /// Corrupt lines are skipped.
    fn session_entries(&self, user_id: u64, day: NaiveDate)
    -> Result<Vec<SessionEntry>, NotesError>;
}
