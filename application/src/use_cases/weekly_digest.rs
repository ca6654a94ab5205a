//! Weekly digest use case.
//!
//! Generates the weekly digest, stores a markdown copy under `summaries/`,
//! links it from the weekly MOC, then commits the vault.

use crate::config::ExecutionParams;
use crate::ports::llm_provider::LlmProvider;
use crate::ports::vault_notes::{NotesError, VaultNotes};
use crate::ports::vault_persistence::VaultPersistence;
use crate::use_cases::shared::{failure_envelope, invoke_provider, persist, report_envelope};
use chrono::NaiveDate;
use dbrain_domain::{LlmResponseEnvelope, PromptTemplate, vault};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::{info, warn};

pub const WEEKLY_COMMIT_MESSAGE: &str = "chore: weekly digest";

static RE_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<b>(.*?)</b>").expect("valid bold pattern"));
static RE_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<i>(.*?)</i>").expect("valid italic pattern"));
static RE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code>(.*?)</code>").expect("valid code pattern"));
static RE_STRIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<s>(.*?)</s>").expect("valid strike pattern"));
static RE_UNDERLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?u>").expect("valid underline pattern"));
static RE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a href="([^"]+)">([^<]+)</a>"#).expect("valid link pattern")
});

/// Convert a light-HTML report to Obsidian markdown.
pub fn html_to_markdown(html: &str) -> String {
    let text = RE_BOLD.replace_all(html, "**$1**");
    let text = RE_ITALIC.replace_all(&text, "*$1*");
    let text = RE_CODE.replace_all(&text, "`$1`");
    let text = RE_STRIKE.replace_all(&text, "~~$1~~");
    let text = RE_UNDERLINE.replace_all(&text, "");
    let text = RE_LINK.replace_all(&text, "[$2]($1)");
    text.into_owned()
}

/// Summary note body: YAML front matter followed by the markdown report.
pub fn summary_document(report_html: &str, day: NaiveDate) -> String {
    format!(
        "---\ndate: {}\ntype: weekly-summary\nweek: {}\n---\n\n{}",
        day.format("%Y-%m-%d"),
        vault::iso_week_label(day),
        html_to_markdown(report_html)
    )
}

/// Add a link to `stem` under the "Previous Weeks" heading.
///
/// Returns `None` when the MOC already mentions the summary.
pub fn link_in_moc(moc: &str, stem: &str) -> Option<String> {
    if moc.contains(stem) {
        return None;
    }

    let link = format!("- [[{}/{}.md|{}]]", vault::SUMMARIES_DIR, stem, stem);
    let marker = format!("{}\n", vault::PREVIOUS_WEEKS_HEADING);
    let updated = match moc.find(&marker) {
        Some(pos) => {
            let insert_at = pos + marker.len();
            format!("{}\n{}\n{}", &moc[..insert_at], link, &moc[insert_at..])
        }
        None => format!("{}\n\n{}\n", moc.trim_end(), link),
    };
    Some(updated)
}

/// Use case for generating the weekly digest.
#[derive(Clone)]
pub struct WeeklyDigestUseCase {
    provider: Arc<dyn LlmProvider>,
    notes: Arc<dyn VaultNotes>,
    persistence: Arc<dyn VaultPersistence>,
    execution: ExecutionParams,
}

impl WeeklyDigestUseCase {
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

    pub async fn execute(&self, today: NaiveDate) -> LlmResponseEnvelope {
        let started = Instant::now();
        let kind = self.provider.kind();
        info!(%today, provider = %kind, "Generating weekly digest");

        let prompt = PromptTemplate::weekly(today, kind);
        let output =
            match invoke_provider(self.provider.as_ref(), prompt, &self.execution, "weekly").await {
                Ok(output) => output,
                Err(e) => return failure_envelope(kind, e, started),
            };

        let raw = output.text.trim().to_string();
        let envelope = report_envelope(kind, output, started);
        if envelope.is_error() {
            return envelope;
        }

        match self.save_summary(&raw, today) {
            Ok(path) => info!(path = %path.display(), "Weekly summary saved"),
            Err(e) => warn!("Failed to save weekly summary: {}", e),
        }

        persist(
            envelope,
            self.persistence.as_ref(),
            WEEKLY_COMMIT_MESSAGE,
            started,
        )
        .await
    }

    fn save_summary(&self, report_html: &str, today: NaiveDate) -> Result<PathBuf, NotesError> {
        let summary_path = vault::weekly_summary(today);
        self.notes
            .write(&summary_path, &summary_document(report_html, today))?;

        let moc_path = Path::new(vault::WEEKLY_MOC_FILE);
        if let Some(moc) = self.notes.read(moc_path)? {
            let stem = vault::weekly_summary_stem(today);
            if let Some(updated) = link_in_moc(&moc, &stem) {
                self.notes.write(moc_path, &updated)?;
                info!("Linked {} from weekly MOC", stem);
            }
        }

        Ok(summary_path)
    }
}
