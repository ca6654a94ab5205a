//! Execute prompt use case.
//!
//! Runs an arbitrary user request with today's session context and the
//! tracker reference from the vault, then commits the vault.

use crate::config::ExecutionParams;
use crate::ports::llm_provider::LlmProvider;
use crate::ports::vault_notes::VaultNotes;
use crate::ports::vault_persistence::VaultPersistence;
use crate::use_cases::shared::{failure_envelope, invoke_provider, persist, report_envelope};
use chrono::NaiveDate;
use dbrain_domain::util::truncate_str;
use dbrain_domain::{LlmResponseEnvelope, PromptTemplate, RequestContext, vault};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Commit message used after a request run
pub const REQUEST_COMMIT_MESSAGE: &str = "chore: process request";

/// Input for the [`ExecutePromptUseCase`].
#[derive(Debug, Clone)]
pub struct ExecutePromptInput {
    /// The user's request text.
    pub request: String,
    /// Channel user id; `0` means no session context.
    pub user_id: u64,
    pub today: NaiveDate,
}

impl ExecutePromptInput {
    pub fn new(request: impl Into<String>, user_id: u64) -> Self {
        Self {
            request: request.into(),
            user_id,
            today: chrono::Local::now().date_naive(),
        }
    }

    pub fn on(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

/// Use case for running an ad-hoc request.
#[derive(Clone)]
pub struct ExecutePromptUseCase {
    provider: Arc<dyn LlmProvider>,
    notes: Arc<dyn VaultNotes>,
    persistence: Arc<dyn VaultPersistence>,
    execution: ExecutionParams,
}

impl ExecutePromptUseCase {
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

    pub async fn execute(&self, input: ExecutePromptInput) -> LlmResponseEnvelope {
        let started = Instant::now();
        let kind = self.provider.kind();
        info!(
            user_id = input.user_id,
            "Executing request: {}",
            truncate_str(&input.request, 100)
        );

        let session_context = self.session_context(input.user_id, input.today);
        let tracker_reference = match self.notes.read(Path::new(vault::TRACKER_REFERENCE_FILE)) {
            Ok(content) => content.unwrap_or_default(),
            Err(e) => {
                warn!("Failed to load tracker reference: {}", e);
                String::new()
            }
        };
        let vault_path = self.notes.root().display().to_string();

        let prompt = PromptTemplate::request(
            &RequestContext {
                today: input.today,
                vault_path: &vault_path,
                session_context: &session_context,
                tracker_reference: &tracker_reference,
                request: &input.request,
            },
            kind,
        );

        let envelope =
            match invoke_provider(self.provider.as_ref(), prompt, &self.execution, "request").await
            {
                Ok(output) => report_envelope(kind, output, started),
                Err(e) => return failure_envelope(kind, e, started),
            };

        persist(
            envelope,
            self.persistence.as_ref(),
            REQUEST_COMMIT_MESSAGE,
            started,
        )
        .await
    }

    fn session_context(&self, user_id: u64, today: NaiveDate) -> String {
        if user_id == 0 {
            return String::new();
        }

        match self.notes.session_entries(user_id, today) {
            Ok(entries) => {
                let skip = entries.len().saturating_sub(vault::SESSION_CONTEXT_ENTRIES);
                debug!(user_id, entries = entries.len(), "Loaded session context");
                PromptTemplate::session_context(&entries[skip..])
            }
            Err(e) => {
                warn!(user_id, "Failed to load session context: {}", e);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_provider::ProviderOutput;
    use crate::ports::vault_persistence::CommitOutcome;
    use crate::use_cases::shared::testing::{MemoryNotes, RecordingPersistence, ScriptedProvider};
    use dbrain_domain::{Persistence, ProviderKind, SessionEntry};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
    }

    fn entry(ts: &str, text: &str) -> SessionEntry {
        SessionEntry {
            ts: ts.to_string(),
            entry_type: "text".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_prompt_includes_context() {
        let mut entries: Vec<SessionEntry> = (0..12)
            .map(|i| entry(&format!("2026-05-04T10:{:02}:00", i), &format!("note {}", i)))
            .collect();
        entries.push(entry("2026-05-03T23:00:00", "yesterday"));

        let notes = MemoryNotes::new()
            .with_file(vault::TRACKER_REFERENCE_FILE, "Use p1 for urgent tasks")
            .with_session(42, entries);
        let provider = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Ok(ProviderOutput::new("✅ <b>Task created</b>"))],
        ));
        let persistence = Arc::new(RecordingPersistence::new(CommitOutcome::NoChanges));
        let use_case = ExecutePromptUseCase::new(provider.clone(), Arc::new(notes), persistence.clone());

        let envelope = use_case
            .execute(ExecutePromptInput::new("Remind me to water plants", 42).on(today()))
            .await;

        assert_eq!(envelope.report_text(), Some("✅ <b>Task created</b>"));
        assert_eq!(envelope.persistence(), &Persistence::NoChanges);
        assert_eq!(persistence.messages(), vec![REQUEST_COMMIT_MESSAGE]);

        let prompt = provider.last_prompt();
        assert!(prompt.contains("Current date: 2026-05-04"));
        assert!(prompt.contains("Vault path: /vault"));
        assert!(prompt.contains("Use p1 for urgent tasks"));
        assert!(prompt.contains("Remind me to water plants"));
        // only the last 10 entries of today
        assert!(!prompt.contains("note 1\n"));
        assert!(prompt.contains("10:02 [text] note 2"));
        assert!(prompt.contains("note 11"));
        assert!(!prompt.contains("yesterday"));
    }

    #[tokio::test]
    async fn test_anonymous_user_has_no_session_block() {
        let notes = MemoryNotes::new().with_session(0, vec![entry("2026-05-04T08:00:00", "hidden")]);
        let provider = Arc::new(ScriptedProvider::new(
            ProviderKind::ClaudeCli,
            vec![Ok(ProviderOutput::new("ok"))],
        ));
        let persistence = Arc::new(RecordingPersistence::new(CommitOutcome::Committed));
        let use_case = ExecutePromptUseCase::new(provider.clone(), Arc::new(notes), persistence);

        use_case
            .execute(ExecutePromptInput::new("hi", 0).on(today()))
            .await;

        let prompt = provider.last_prompt();
        assert!(!prompt.contains("TODAY'S SESSION"));
        assert!(!prompt.contains("hidden"));
        assert!(prompt.contains("mcp__todoist__user-info"));
    }

    #[tokio::test]
    async fn test_report_is_sanitized() {
        let provider = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            vec![Ok(ProviderOutput::new("<b>2 < 3</b> <script>x</script>"))],
        ));
        let persistence = Arc::new(RecordingPersistence::new(CommitOutcome::Committed));
        let use_case =
            ExecutePromptUseCase::new(provider, Arc::new(MemoryNotes::new()), persistence);

        let envelope = use_case
            .execute(ExecutePromptInput::new("compare", 0).on(today()))
            .await;
        assert_eq!(
            envelope.report_text(),
            Some("<b>2 &lt; 3</b> &lt;script&gt;x&lt;/script&gt;")
        );
    }
}
