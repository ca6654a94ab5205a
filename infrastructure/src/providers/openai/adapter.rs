//! OpenAI-compatible provider adapter with a bounded tool loop.

use super::types::{ChatMessage, ChatRequest, ChatResponse, ToolCall};
use crate::capabilities::OpenAiToolSchema;
use async_trait::async_trait;
use dbrain_application::ports::capability_runtime::CapabilityRuntime;
use dbrain_application::ports::llm_provider::{
    LlmProvider, ProviderError, ProviderErrorKind, ProviderOutput, ProviderRequest,
};
use dbrain_application::ports::tool_schema::ToolSchemaPort;
use dbrain_domain::util::truncate_str;
use dbrain_domain::{
    OpenAiConfig, ProviderKind, ResponseMeta, ToolCallRequest, ToolExecutionResult, ToolFailure,
    ToolFailureRecord,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Error bodies kept in provider errors
const MAX_ERROR_BODY: usize = 500;

pub struct OpenAiProvider {
    config: OpenAiConfig,
    runtime: Arc<dyn CapabilityRuntime>,
    tools: Vec<Value>,
    http: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig, runtime: Arc<dyn CapabilityRuntime>) -> Self {
        let tools = OpenAiToolSchema.all_tools_schema(runtime.catalog());
        Self {
            config,
            runtime,
            tools,
            http: reqwest::Client::new(),
        }
    }

    /// One chat completion round trip, bounded by `remaining`.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        remaining: Duration,
        budget: Duration,
    ) -> Result<ChatResponse, ProviderErrorKind> {
        let body = ChatRequest {
            model: self.config.model(),
            messages,
            temperature: self.config.temperature(),
            tools: &self.tools,
            tool_choice: (!self.tools.is_empty()).then_some("auto"),
        };

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(self.config.api_key())
            .timeout(remaining)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, budget))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error(e, budget))?;

        if !status.is_success() {
            return Err(ProviderErrorKind::Unavailable(format!(
                "OpenAI API error {}: {}",
                status.as_u16(),
                truncate_str(&text, MAX_ERROR_BODY)
            )));
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderErrorKind::InvalidResponse(format!("Malformed completion body: {}", e))
        })
    }

    /// Run one requested tool call through the runtime.
    ///
    /// Unknown function names and malformed argument JSON never reach the
    /// runtime; they become failures fed back to the model.
    async fn execute_tool_call(&self, call: &ToolCall) -> ToolExecutionResult {
        let function = call.function.name.as_str();
        let Some(capability) = self
            .runtime
            .catalog()
            .by_function_name(function)
            .map(|d| d.name.clone())
        else {
            return ToolExecutionResult::failure(function, ToolFailure::unsupported(function));
        };

        let arguments = match parse_arguments(&call.function.arguments) {
            Ok(arguments) => arguments,
            Err(failure) => return ToolExecutionResult::failure(capability, failure),
        };

        let request = ToolCallRequest {
            capability,
            arguments,
            call_id: Some(call.id.clone()),
        };
        self.runtime.execute(&request).await
    }
}

fn transport_error(error: reqwest::Error, budget: Duration) -> ProviderErrorKind {
    if error.is_timeout() {
        ProviderErrorKind::Timeout(budget)
    } else {
        ProviderErrorKind::Unavailable(format!("OpenAI transport error: {}", error))
    }
}

fn parse_arguments(raw: &str) -> Result<serde_json::Map<String, Value>, ToolFailure> {
    if raw.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ToolFailure::invalid_argument(
            "Tool arguments must be a JSON object",
        )),
        Err(e) => Err(ToolFailure::invalid_argument(format!(
            "Malformed tool arguments: {}",
            e
        ))),
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn run(&self, request: &ProviderRequest) -> Result<ProviderOutput, ProviderError> {
        let deadline = Instant::now() + request.timeout;
        let mut messages = vec![ChatMessage::user(request.prompt.as_str())];
        let mut failures: Vec<ToolFailureRecord> = Vec::new();

        for iteration in 1..=request.max_iterations {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                error!(iteration, "OpenAI tool loop exceeded its deadline");
                return Err(ProviderError::timeout(request.timeout).with_tool_failures(failures));
            }

            let ChatResponse {
                id,
                model,
                choices,
                usage,
            } = match self.complete(&messages, remaining, request.timeout).await {
                Ok(response) => response,
                Err(kind) => return Err(ProviderError::new(kind).with_tool_failures(failures)),
            };

            let Some(message) = choices.into_iter().next().map(|c| c.message) else {
                return Err(ProviderError::invalid_response("Completion has no choices")
                    .with_tool_failures(failures));
            };

            if message.tool_calls.is_empty() {
                info!(
                    iteration,
                    tool_failures = failures.len(),
                    "OpenAI returned a final answer"
                );
                let meta = ResponseMeta {
                    model: model.or_else(|| Some(self.config.model().to_string())),
                    response_id: id,
                    usage,
                    exit_code: None,
                    iterations: Some(iteration as u32),
                };
                return Ok(ProviderOutput::new(message.content.unwrap_or_default())
                    .with_tool_failures(failures)
                    .with_meta(meta));
            }

            debug!(
                iteration,
                tool_calls = message.tool_calls.len(),
                "Assistant requested tools"
            );
            let calls = message.tool_calls.clone();
            messages.push(ChatMessage::assistant(message.content, message.tool_calls));

            for call in &calls {
                let remaining = deadline.saturating_duration_since(Instant::now());
                let result = match tokio::time::timeout(remaining, self.execute_tool_call(call))
                    .await
                {
                    Ok(result) if !remaining.is_zero() => result,
                    _ => {
                        error!(
                            iteration,
                            tool = call.function.name.as_str(),
                            "OpenAI tool loop exceeded its deadline during a tool call"
                        );
                        return Err(
                            ProviderError::timeout(request.timeout).with_tool_failures(failures)
                        );
                    }
                };
                if let Some(record) = result.failure_record() {
                    failures.push(record);
                }
                messages.push(ChatMessage::tool(
                    call.id.as_str(),
                    result.to_tool_message().to_string(),
                ));
            }
        }

        error!(
            max_iterations = request.max_iterations,
            "OpenAI tool loop did not converge"
        );
        Err(ProviderError::new(ProviderErrorKind::NonConvergence {
            iterations: request.max_iterations,
        })
        .with_tool_failures(failures))
    }
}
