//! Vault persistence port
//!
//! Commits and pushes vault changes after a successful use case.

use async_trait::async_trait;
use dbrain_domain::Persistence;

/// Result of one commit/push attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Changes were committed and pushed
    Committed,
    /// Nothing to commit under the vault scope
    NoChanges,
    /// A git step failed; the message names it
    Failed(String),
}

impl CommitOutcome {
    /// `true` for both `Committed` and `NoChanges`
    pub fn is_success(&self) -> bool {
        !matches!(self, CommitOutcome::Failed(_))
    }
}

impl From<CommitOutcome> for Persistence {
    fn from(outcome: CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::Committed => Persistence::Committed,
            CommitOutcome::NoChanges => Persistence::NoChanges,
            CommitOutcome::Failed(message) => Persistence::Failed(message),
        }
    }
}

/// Port for committing vault changes
#[async_trait]
pub trait VaultPersistence: Send + Sync {
    /// Stage, commit and push everything under the vault.
    async fn commit_and_push(&self, message: &str) -> CommitOutcome;
}
