//! Prompt templates for the daily, ad-hoc and weekly flows

use crate::capability::function_name;
use crate::providers::ProviderKind;
use crate::vault::SessionEntry;
use chrono::NaiveDate;

/// Which flow a set of tool instructions is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptFlow {
    Daily,
    Request,
    Weekly,
}

/// Inputs for an ad-hoc request prompt
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    pub today: NaiveDate,
    pub vault_path: &'a str,
    /// Rendered session block (see [`PromptTemplate::session_context`]); may be empty
    pub session_context: &'a str,
    pub tracker_reference: &'a str,
    pub request: &'a str,
}

const OUTPUT_FORMAT_RULES: &str = r#"CRITICAL OUTPUT FORMAT:
- Return ONLY raw HTML for the chat channel
- NO markdown: no **, no ##, no ```, no tables
- Allowed tags: <b>, <i>, <code>, <s>, <u>, <a href="...">
- Be concise: the channel limit is 4096 characters"#;

/// Capabilities called out by name for function-calling providers
const ADVERTISED_CAPABILITIES: &[&str] = &[
    "tracker.user_info",
    "tracker.create_task",
    "tracker.list_tasks",
    "tracker.find_completed_tasks",
    "vault.read_file",
    "vault.write_file",
    "vault.list_files",
];

/// Templates for generating prompts for each use case
pub struct PromptTemplate;

impl PromptTemplate {
    /// Tool-use instructions tailored to how the provider exposes tools.
    pub fn tool_instructions(provider: ProviderKind, flow: PromptFlow) -> String {
        let mut text = match provider {
            ProviderKind::OpenAi => {
                let tools: Vec<String> = ADVERTISED_CAPABILITIES
                    .iter()
                    .map(|c| function_name(c))
                    .collect();
                format!(
                    r#"FIRST: call {} to confirm tool access.

CRITICAL TOOL RULE:
- You have these tools: {}.
- Call tools directly.
- NEVER answer that tools are unavailable or ask the user to act manually."#,
                    function_name("tracker.user_info"),
                    tools.join(", ")
                )
            }
            ProviderKind::ClaudeCli => r#"FIRST: call mcp__todoist__user-info to confirm the MCP server works.

CRITICAL MCP RULE:
- You HAVE ACCESS to the mcp__todoist__* tools. Call them directly.
- NEVER answer that MCP is unavailable or ask the user to act manually."#
                .to_string(),
        };

        let hint = match (provider, flow) {
            (ProviderKind::OpenAi, PromptFlow::Daily) => {
                Some(format!("- For tasks: call {}.", function_name("tracker.create_task")))
            }
            (ProviderKind::ClaudeCli, PromptFlow::Daily) => {
                Some("- For tasks: call the mcp__todoist__add-tasks tool.".to_string())
            }
            (ProviderKind::OpenAi, PromptFlow::Weekly) => Some(format!(
                "- For completed tasks: call {}.",
                function_name("tracker.find_completed_tasks")
            )),
            (ProviderKind::ClaudeCli, PromptFlow::Weekly) => Some(
                "- For completed tasks: call the mcp__todoist__find-completed-tasks tool."
                    .to_string(),
            ),
            (_, PromptFlow::Request) => None,
        };
        if let Some(hint) = hint {
            text.push('\n');
            text.push_str(&hint);
        }

        text.push_str("\n- If a tool returns an error, show the EXACT error in the report.");
        text
    }

    /// Prompt for processing one day's note
    pub fn daily(day: NaiveDate, skill: &str, provider: ProviderKind) -> String {
        format!(
            r#"Today is {day}. Run the daily processing.

=== SKILL INSTRUCTIONS ===
{skill}
=== END SKILL ===

{tools}

{format}
- Start directly with 📊 <b>Processing for {day}</b>
- If the entries were already processed, return a status report in the same format"#,
            day = day,
            skill = skill,
            tools = Self::tool_instructions(provider, PromptFlow::Daily),
            format = OUTPUT_FORMAT_RULES,
        )
    }

    /// Prompt for an arbitrary user request
    pub fn request(ctx: &RequestContext<'_>, provider: ProviderKind) -> String {
        format!(
            r#"You are the dbrain personal assistant.

CONTEXT:
- Current date: {today}
- Vault path: {vault}

{session}=== TRACKER REFERENCE ===
{reference}
=== END REFERENCE ===

{tools}

USER REQUEST:
{request}

{format}
- Start with an emoji and a <b>header</b>

EXECUTION:
1. Analyze the request
2. Call the available tracker and vault tools directly
3. Return an HTML status report with the results"#,
            today = ctx.today,
            vault = ctx.vault_path,
            session = ctx.session_context,
            reference = ctx.tracker_reference,
            tools = Self::tool_instructions(provider, PromptFlow::Request),
            request = ctx.request,
            format = OUTPUT_FORMAT_RULES,
        )
    }

    /// Prompt for the weekly digest
    pub fn weekly(today: NaiveDate, provider: ProviderKind) -> String {
        format!(
            r#"Today is {today}. Generate the weekly digest.

{tools}

WORKFLOW:
1. Collect the week's data (daily notes in daily/, completed tasks via the tools)
2. Review progress against goals (goals/3-weekly.md)
3. Identify wins and challenges
4. Produce the HTML report

{format}
- Start with 📅 <b>Weekly digest</b>"#,
            today = today,
            tools = Self::tool_instructions(provider, PromptFlow::Weekly),
            format = OUTPUT_FORMAT_RULES,
        )
    }

    /// Render the most recent session entries as a prompt block.
    ///
    /// Returns an empty string when there is nothing to show, so the block
    /// can be interpolated unconditionally.
    pub fn session_context(entries: &[SessionEntry]) -> String {
        let lines: Vec<String> = entries
            .iter()
            .filter(|e| !e.text.is_empty())
            .map(|e| {
                let text: String = e.text.chars().take(80).collect();
                format!("{} [{}] {}", e.time_of_day(), e.entry_type, text)
            })
            .collect();

        if lines.is_empty() {
            return String::new();
        }

        format!(
            "=== TODAY'S SESSION ===\n{}\n=== END SESSION ===\n\n",
            lines.join("\n")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
    }

    #[test]
    fn test_openai_instructions_use_function_names() {
        let text = PromptTemplate::tool_instructions(ProviderKind::OpenAi, PromptFlow::Daily);
        assert!(text.contains("tracker_user_info"));
        assert!(text.contains("vault_write_file"));
        assert!(text.contains("call tracker_create_task"));
        assert!(!text.contains("mcp__"));
    }

    #[test]
    fn test_cli_instructions_use_mcp_names() {
        let text = PromptTemplate::tool_instructions(ProviderKind::ClaudeCli, PromptFlow::Weekly);
        assert!(text.contains("mcp__todoist__user-info"));
        assert!(text.contains("find-completed-tasks"));
        assert!(!text.contains("tracker_user_info"));
    }

    #[test]
    fn test_daily_prompt_contains_skill_and_date() {
        let prompt = PromptTemplate::daily(day(), "Process inbox first.", ProviderKind::ClaudeCli);
        assert!(prompt.starts_with("Today is 2026-02-10."));
        assert!(prompt.contains("Process inbox first."));
        assert!(prompt.contains("<b>Processing for 2026-02-10</b>"));
    }

    #[test]
    fn test_request_prompt() {
        let ctx = RequestContext {
            today: day(),
            vault_path: "/home/me/vault",
            session_context: "",
            tracker_reference: "priorities: p1..p4",
            request: "Remind me to call mom",
        };
        let prompt = PromptTemplate::request(&ctx, ProviderKind::OpenAi);
        assert!(prompt.contains("Vault path: /home/me/vault"));
        assert!(prompt.contains("USER REQUEST:\nRemind me to call mom"));
        assert!(prompt.contains("priorities: p1..p4"));
    }

    #[test]
    fn test_session_context_rendering() {
        let entries = vec![
            SessionEntry {
                ts: "2026-02-10T08:30:00".into(),
                entry_type: "text".into(),
                text: "x".repeat(120),
            },
            SessionEntry {
                ts: "2026-02-10T09:00:00".into(),
                entry_type: "voice".into(),
                text: String::new(),
            },
        ];
        let block = PromptTemplate::session_context(&entries);
        assert!(block.starts_with("=== TODAY'S SESSION ===\n08:30 [text] "));
        assert!(block.contains(&"x".repeat(80)));
        assert!(!block.contains(&"x".repeat(81)));
        assert!(!block.contains("[voice]"));

        assert_eq!(PromptTemplate::session_context(&[]), "");
    }
}
