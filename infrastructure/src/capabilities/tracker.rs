//! Task tracker capabilities over the Todoist HTTP API
//!
//! All calls authenticate with a bearer token. Failures are mapped onto the
//! shared capability codes; nothing is retried here.

use dbrain_domain::capability::codes;
use dbrain_domain::util::truncate_str;
use dbrain_domain::{ToolCallRequest, ToolFailure};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TRACKER_BASE_URL: &str = "https://api.todoist.com";

/// Per-request timeout
pub const DEFAULT_TRACKER_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies kept in failure details
const MAX_ERROR_BODY: usize = 500;

/// Optional task fields forwarded verbatim on create/update
const TASK_FIELDS: &[&str] = &["description", "due_string", "priority", "project_id", "labels"];

#[derive(Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for TrackerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerClient")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TrackerClient {
    pub fn new(api_key: Option<String>, base_url: &str) -> Self {
        Self::with_timeout(api_key, base_url, DEFAULT_TRACKER_TIMEOUT)
    }

    pub fn with_timeout(api_key: Option<String>, base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn user_info(&self, _call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let form = [("sync_token", "*"), ("resource_types", r#"["user"]"#)];
        let request = self.request(Method::POST, "/sync/v9/sync")?.form(&form);
        let data = self.send(request).await?;

        let user = &data["user"];
        let name = user["full_name"]
            .as_str()
            .filter(|s| !s.is_empty())
            .or_else(|| user["name"].as_str())
            .unwrap_or_default();
        Ok(json!({
            "userId": id_string(&user["id"]),
            "email": user["email"].as_str().unwrap_or_default(),
            "name": name,
        }))
    }

    pub async fn create_task(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let content = call
            .require_string("content")
            .map_err(ToolFailure::invalid_argument)?;
        let mut body = task_body(call);
        body.insert("content".into(), content.trim().into());

        let request = self.request(Method::POST, "/rest/v2/tasks")?.json(&body);
        let data = self.send(request).await?;
        Ok(json!({
            "id": id_string(&data["id"]),
            "content": data["content"].as_str().unwrap_or(content),
            "url": data["url"].as_str().unwrap_or_default(),
        }))
    }

    pub async fn list_tasks(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let mut query = Vec::new();
        for key in ["project_id", "filter"] {
            if let Some(value) = call.get_string(key) {
                query.push((key, value.to_string()));
            }
        }
        let limit = positive_limit(call)?;

        let request = self.request(Method::GET, "/rest/v2/tasks")?.query(&query);
        let data = self.send(request).await?;
        let items = data.as_array().cloned().unwrap_or_default();

        let tasks: Vec<Value> = items
            .iter()
            .filter(|item| item.is_object())
            .take(limit.unwrap_or(usize::MAX))
            .map(|item| {
                json!({
                    "id": id_string(&item["id"]),
                    "content": item["content"].as_str().unwrap_or_default(),
                    "due": item["due"]["string"].as_str(),
                    "priority": item["priority"].as_i64().unwrap_or(1),
                })
            })
            .collect();
        Ok(json!({ "tasks": tasks }))
    }

    pub async fn update_task(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let task_id = task_id(call)?;
        let mut body = task_body(call);
        if let Some(content) = call.get_string("content") {
            body.insert("content".into(), content.into());
        }
        if body.is_empty() {
            return Err(ToolFailure::invalid_argument(
                "tracker.update_task requires at least one field to change",
            ));
        }

        let path = format!("/rest/v2/tasks/{}", task_id);
        let request = self.request(Method::POST, &path)?.json(&body);
        let data = self.send(request).await?;
        Ok(json!({
            "id": task_id,
            "content": data["content"].as_str().unwrap_or_default(),
        }))
    }

    pub async fn complete_task(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let task_id = task_id(call)?;
        let path = format!("/rest/v2/tasks/{}/close", task_id);
        self.send(self.request(Method::POST, &path)?).await?;
        Ok(json!({ "id": task_id, "completed": true }))
    }

    pub async fn delete_task(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let task_id = task_id(call)?;
        let path = format!("/rest/v2/tasks/{}", task_id);
        self.send(self.request(Method::DELETE, &path)?).await?;
        Ok(json!({ "id": task_id, "deleted": true }))
    }

    pub async fn find_completed_tasks(&self, call: &ToolCallRequest) -> Result<Value, ToolFailure> {
        let mut query: Vec<(&str, String)> = Vec::new();
        for key in ["since", "until"] {
            if let Some(value) = call.get_string(key) {
                query.push((key, value.to_string()));
            }
        }
        if let Some(limit) = positive_limit(call)? {
            query.push(("limit", limit.to_string()));
        }

        let request = self
            .request(Method::GET, "/sync/v9/completed/get_all")?
            .query(&query);
        let data = self.send(request).await?;

        let tasks: Vec<Value> = data["items"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|item| item.is_object())
            .map(|item| {
                let id = if item["task_id"].is_null() {
                    &item["id"]
                } else {
                    &item["task_id"]
                };
                json!({
                    "id": id_string(id),
                    "content": item["content"].as_str().unwrap_or_default(),
                    "completedAt": item["completed_at"].as_str().unwrap_or_default(),
                })
            })
            .collect();
        Ok(json!({ "tasks": tasks }))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ToolFailure> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            ToolFailure::execution(
                codes::MISSING_CREDENTIALS,
                "Tracker API key is not configured (set TODOIST_API_KEY)",
            )
        })?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "Tracker request");
        Ok(self.http.request(method, url).bearer_auth(key))
    }

    /// Send and decode. Empty success bodies decode to `null`.
    async fn send(&self, request: RequestBuilder) -> Result<Value, ToolFailure> {
        let response = request.send().await.map_err(transport_failure)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_failure)?;

        if let Some(failure) = status_failure(status, &body) {
            return Err(failure);
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            ToolFailure::execution(
                codes::INVALID_RESPONSE,
                format!("Tracker response is not valid JSON: {}", e),
            )
            .with_details(json!({ "body": truncate_str(&body, MAX_ERROR_BODY) }))
        })
    }
}

fn transport_failure(error: reqwest::Error) -> ToolFailure {
    if error.is_timeout() {
        ToolFailure::execution(codes::TIMEOUT, "Tracker request timed out").retryable(true)
    } else {
        ToolFailure::execution(
            codes::TRANSPORT_ERROR,
            format!("Tracker transport error: {}", error),
        )
        .retryable(true)
    }
}

fn status_failure(status: StatusCode, body: &str) -> Option<ToolFailure> {
    if !status.is_client_error() && !status.is_server_error() {
        return None;
    }
    let details = json!({
        "status": status.as_u16(),
        "body": truncate_str(body, MAX_ERROR_BODY),
    });
    let failure = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ToolFailure::execution(
            codes::AUTH_FAILED,
            format!("Tracker rejected the API key ({})", status.as_u16()),
        ),
        _ => ToolFailure::execution(
            codes::HTTP_ERROR,
            format!("Tracker API error {}", status.as_u16()),
        )
        .retryable(status.is_server_error()),
    };
    Some(failure.with_details(details))
}

fn task_body(call: &ToolCallRequest) -> Map<String, Value> {
    TASK_FIELDS
        .iter()
        .filter_map(|&key| {
            call.arguments
                .get(key)
                .filter(|v| !v.is_null())
                .map(|v| (key.to_string(), v.clone()))
        })
        .collect()
}

fn task_id(call: &ToolCallRequest) -> Result<String, ToolFailure> {
    let id = call
        .require_string("task_id")
        .map_err(ToolFailure::invalid_argument)?;
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ToolFailure::invalid_argument(format!(
            "Invalid task_id: {}",
            id
        )));
    }
    Ok(id.to_string())
}

fn positive_limit(call: &ToolCallRequest) -> Result<Option<usize>, ToolFailure> {
    match call.get_i64("limit") {
        None => Ok(None),
        Some(n) if n >= 1 => Ok(Some(n as usize)),
        Some(n) => Err(ToolFailure::invalid_argument(format!(
            "limit must be positive, got {}",
            n
        ))),
    }
}

/// Tracker ids arrive as strings or numbers depending on the endpoint.
fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
