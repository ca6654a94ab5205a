//! Processor facade.
//!
//! Stable entry point for callers (chat handlers, scheduled jobs). Exposes
//! the three use cases returning typed envelopes, plus `*_legacy` variants
//! returning the flat key/value view older formatters consume.

use crate::config::ExecutionParams;
use crate::ports::llm_provider::LlmProvider;
use crate::ports::vault_notes::VaultNotes;
use crate::ports::vault_persistence::VaultPersistence;
use crate::use_cases::daily_processing::DailyProcessingUseCase;
use crate::use_cases::execute_prompt::{ExecutePromptInput, ExecutePromptUseCase};
use crate::use_cases::weekly_digest::WeeklyDigestUseCase;
use chrono::NaiveDate;
use dbrain_domain::{LlmResponseEnvelope, ProviderKind};
use std::sync::Arc;

pub type LegacyMap = serde_json::Map<String, serde_json::Value>;

#[derive(Clone)]
pub struct LlmProcessor {
    provider: ProviderKind,
    daily: DailyProcessingUseCase,
    prompt: ExecutePromptUseCase,
    weekly: WeeklyDigestUseCase,
}

impl LlmProcessor {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        notes: Arc<dyn VaultNotes>,
        persistence: Arc<dyn VaultPersistence>,
        execution: ExecutionParams,
    ) -> Self {
        Self {
            provider: provider.kind(),
            daily: DailyProcessingUseCase::new(provider.clone(), notes.clone(), persistence.clone())
                .with_execution(execution.clone()),
            prompt: ExecutePromptUseCase::new(provider.clone(), notes.clone(), persistence.clone())
                .with_execution(execution.clone()),
            weekly: WeeklyDigestUseCase::new(provider, notes, persistence)
                .with_execution(execution),
        }
    }

    /// Active provider
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub async fn process_daily(&self, day: NaiveDate) -> LlmResponseEnvelope {
        self.daily.execute(day).await
    }

    pub async fn process_daily_legacy(&self, day: NaiveDate) -> LegacyMap {
        self.process_daily(day).await.to_legacy_map()
    }

    pub async fn execute_prompt(&self, input: ExecutePromptInput) -> LlmResponseEnvelope {
        self.prompt.execute(input).await
    }

    pub async fn execute_prompt_legacy(&self, input: ExecutePromptInput) -> LegacyMap {
        self.execute_prompt(input).await.to_legacy_map()
    }

    pub async fn generate_weekly(&self, today: NaiveDate) -> LlmResponseEnvelope {
        self.weekly.execute(today).await
    }

    pub async fn generate_weekly_legacy(&self, today: NaiveDate) -> LegacyMap {
        self.generate_weekly(today).await.to_legacy_map()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_provider::ProviderOutput;
    use crate::ports::vault_persistence::CommitOutcome;
    use crate::use_cases::shared::testing::{MemoryNotes, RecordingPersistence, ScriptedProvider};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn processor(notes: MemoryNotes, responses: Vec<ProviderOutput>) -> LlmProcessor {
        let provider = Arc::new(ScriptedProvider::new(
            ProviderKind::OpenAi,
            responses.into_iter().map(Ok).collect(),
        ));
        let persistence = Arc::new(RecordingPersistence::new(CommitOutcome::Committed));
        LlmProcessor::new(provider, Arc::new(notes), persistence, ExecutionParams::default())
    }

    #[tokio::test]
    async fn test_legacy_daily_missing_input() {
        let map = processor(MemoryNotes::new(), vec![])
            .process_daily_legacy(day())
            .await;
        assert_eq!(map["error"], "No daily file for 2026-06-01");
        assert_eq!(map["error_kind"], "missing_input");
        assert_eq!(map["processed_entries"], 0);
        assert!(!map.contains_key("report"));
    }

    #[tokio::test]
    async fn test_legacy_prompt_report() {
        let processor = processor(MemoryNotes::new(), vec![ProviderOutput::new("<b>ok</b>")]);
        assert_eq!(processor.provider(), ProviderKind::OpenAi);

        let map = processor
            .execute_prompt_legacy(ExecutePromptInput::new("ping", 0).on(day()))
            .await;
        assert_eq!(map["report"], "<b>ok</b>");
        assert_eq!(map["provider"], "openai");
        assert_eq!(map["processed_entries"], 1);
        assert_eq!(map["persistence"], "committed");
        assert!(!map.contains_key("error"));
    }

    #[tokio::test]
    async fn test_typed_and_legacy_views_agree() {
        let processor = processor(
            MemoryNotes::new(),
            vec![ProviderOutput::new("digest"), ProviderOutput::new("digest")],
        );
        let envelope = processor.generate_weekly(day()).await;
        let map = processor.generate_weekly_legacy(day()).await;
        assert_eq!(map["report"], envelope.report_text().unwrap());
    }
}
