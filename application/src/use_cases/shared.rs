//! Shared helpers for use cases.
//!
//! Every use case follows the same tail: invoke the provider, wrap the
//! outcome into an envelope, and commit the vault once on success.

use crate::config::ExecutionParams;
use crate::ports::llm_provider::{LlmProvider, ProviderError, ProviderOutput, ProviderRequest};
use crate::ports::vault_persistence::VaultPersistence;
use dbrain_domain::{ErrorKind, LlmResponseEnvelope, Persistence, ProviderKind, sanitize_report};
use std::time::Instant;
use tracing::{error, info, warn};

/// Run `prompt` through the provider with the configured budget.
pub(crate) async fn invoke_provider(
    provider: &dyn LlmProvider,
    prompt: String,
    execution: &ExecutionParams,
    flow: &str,
) -> Result<ProviderOutput, ProviderError> {
    let request = ProviderRequest::new(prompt, execution.timeout, execution.max_iterations);
    info!(
        flow,
        provider = %provider.kind(),
        prompt_bytes = request.prompt.len(),
        "Invoking provider"
    );

    let result = provider.run(&request).await;
    if let Err(e) = &result {
        error!(flow, provider = %provider.kind(), "Provider execution failed: {}", e);
    }
    result
}

/// Envelope for a terminal provider failure.
pub(crate) fn failure_envelope(
    provider: ProviderKind,
    error: ProviderError,
    started: Instant,
) -> LlmResponseEnvelope {
    let kind = error.kind.error_kind();
    let message = error.kind.to_string();
    LlmResponseEnvelope::error(provider, kind, message)
        .with_tool_failures(error.tool_failures)
        .with_elapsed(started.elapsed())
}

/// Envelope for a successful run; the report is sanitized here.
///
/// A blank answer is reported as `invalid_response`.
pub(crate) fn report_envelope(
    provider: ProviderKind,
    output: ProviderOutput,
    started: Instant,
) -> LlmResponseEnvelope {
    let text = output.text.trim();
    if text.is_empty() {
        return LlmResponseEnvelope::error(
            provider,
            ErrorKind::InvalidResponse,
            "Provider returned an empty report",
        )
        .with_tool_failures(output.tool_failures)
        .with_meta(output.meta)
        .with_elapsed(started.elapsed());
    }

    LlmResponseEnvelope::report(provider, sanitize_report(text))
        .with_processed_entries(1)
        .with_tool_failures(output.tool_failures)
        .with_meta(output.meta)
        .with_elapsed(started.elapsed())
}

/// Commit the vault once if the envelope carries a report.
///
/// A failed commit keeps the report and records `persistence = failed`.
pub(crate) async fn persist(
    envelope: LlmResponseEnvelope,
    persistence: &dyn VaultPersistence,
    message: &str,
    started: Instant,
) -> LlmResponseEnvelope {
    if envelope.is_error() {
        return envelope;
    }

    let outcome: Persistence = persistence.commit_and_push(message).await.into();
    if let Persistence::Failed(reason) = &outcome {
        warn!(commit_message = message, "Vault commit failed: {}", reason);
    }

    envelope
        .with_persistence(outcome)
        .with_elapsed(started.elapsed())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted ports shared by the use case tests.

    use crate::ports::llm_provider::{
        LlmProvider, ProviderError, ProviderOutput, ProviderRequest,
    };
    use crate::ports::vault_notes::{NotesError, VaultNotes};
    use crate::ports::vault_persistence::{CommitOutcome, VaultPersistence};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use dbrain_domain::{ProviderKind, SessionEntry};
    use std::collections::{HashMap, VecDeque};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    pub struct ScriptedProvider {
        kind: ProviderKind,
        responses: Mutex<VecDeque<Result<ProviderOutput, ProviderError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        pub fn new(
            kind: ProviderKind,
            responses: Vec<Result<ProviderOutput, ProviderError>>,
        ) -> Self {
            Self {
                kind,
                responses: Mutex::new(VecDeque::from(responses)),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn run(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ProviderError::unavailable("No more responses")))
        }
    }

    pub struct RecordingPersistence {
        outcome: CommitOutcome,
        pub messages: Mutex<Vec<String>>,
    }

    impl RecordingPersistence {
        pub fn new(outcome: CommitOutcome) -> Self {
            Self {
                outcome,
                messages: Mutex::new(Vec::new()),
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VaultPersistence for RecordingPersistence {
        async fn commit_and_push(&self, message: &str) -> CommitOutcome {
            self.messages.lock().unwrap().push(message.to_string());
            self.outcome.clone()
        }
    }

    /// In-memory vault
    #[derive(Default)]
    pub struct MemoryNotes {
        root: PathBuf,
        pub files: Mutex<HashMap<PathBuf, String>>,
        sessions: HashMap<u64, Vec<SessionEntry>>,
        fail_writes: bool,
    }

    impl MemoryNotes {
        pub fn new() -> Self {
            Self {
                root: PathBuf::from("/vault"),
                ..Default::default()
            }
        }

        pub fn with_file(self, path: &str, content: &str) -> Self {
            self.files
                .lock()
                .unwrap()
                .insert(PathBuf::from(path), content.to_string());
            self
        }

        pub fn with_session(mut self, user_id: u64, entries: Vec<SessionEntry>) -> Self {
            self.sessions.insert(user_id, entries);
            self
        }

        pub fn failing_writes(mut self) -> Self {
            self.fail_writes = true;
            self
        }

        pub fn file(&self, path: &str) -> Option<String> {
            self.files.lock().unwrap().get(Path::new(path)).cloned()
        }
    }

    impl VaultNotes for MemoryNotes {
        fn root(&self) -> &Path {
            &self.root
        }

        fn read(&self, relative: &Path) -> Result<Option<String>, NotesError> {
            Ok(self.files.lock().unwrap().get(relative).cloned())
        }

        fn write(&self, relative: &Path, content: &str) -> Result<(), NotesError> {
            if self.fail_writes {
                return Err(NotesError::Io {
                    path: relative.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.files
                .lock()
                .unwrap()
                .insert(relative.to_path_buf(), content.to_string());
            Ok(())
        }

        fn exists(&self, relative: &Path) -> bool {
            self.files.lock().unwrap().contains_key(relative)
        }

        fn session_entries(
            &self,
            user_id: u64,
            day: NaiveDate,
        ) -> Result<Vec<SessionEntry>, NotesError> {
            Ok(self
                .sessions
                .get(&user_id)
                .map(|entries| entries.iter().filter(|e| e.is_on(day)).cloned().collect())
                .unwrap_or_default())
        }
    }
}
