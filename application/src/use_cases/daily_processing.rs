//! Daily processing use case.
//!
//! Processes one day's note (`daily/<YYYY-MM-DD>.md`) with the skill
//! instructions stored in the vault, then commits the vault.

use crate::config::ExecutionParams;
use crate::ports::llm_provider::LlmProvider;
use crate::ports::vault_notes::VaultNotes;
use crate::ports::vault_persistence::VaultPersistence;
use crate::use_cases::shared::{failure_envelope, invoke_provider, persist, report_envelope};
use chrono::NaiveDate;
use dbrain_domain::{ErrorKind, LlmResponseEnvelope, PromptTemplate, vault};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Use case for processing a single daily note.
#[derive(Clone)]
pub struct DailyProcessingUseCase {
    provider: Arc<dyn LlmProvider>,
    notes: Arc<dyn VaultNotes>,
    persistence: Arc<dyn VaultPersistence>,
    execution: ExecutionParams,
}

impl DailyProcessingUseCase {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        notes: Arc<dyn VaultNotes>,
        persistence: Arc<dyn VaultPersistence>,
    ) -> Self {
        Self {
            provider,
            notes,
            persistence,
            execution: ExecutionParams::default(),
        }
    }

    pub fn with_execution(mut self, execution: ExecutionParams) -> Self {
        self.execution = execution;
        self
    }

    pub async fn execute(&self, day: NaiveDate) -> LlmResponseEnvelope {
        let started = Instant::now();
        let kind = self.provider.kind();
        let daily_note = vault::daily_note(day);

        if !self.notes.exists(&daily_note) {
            warn!(%day, "No daily file");
            return LlmResponseEnvelope::error(
                kind,
                ErrorKind::MissingInput,
                format!("No daily file for {}", day),
            )
            .with_elapsed(started.elapsed());
        }

        info!(%day, provider = %kind, "Starting daily processing");

        let skill = match self.notes.read(Path::new(vault::SKILL_FILE)) {
            Ok(content) => content.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to load skill instructions: {}", e);
                String::new()
            }
        };
        let prompt = PromptTemplate::daily(day, &skill, kind);

        let envelope =
            match invoke_provider(self.provider.as_ref(), prompt, &self.execution, "daily").await {
                Ok(output) => report_envelope(kind, output, started),
                Err(e) => return failure_envelope(kind, e, started),
            };

        let message = format!("chore: process daily {}", day);
        persist(envelope, self.persistence.as_ref(), &message, started).await
    }
}
