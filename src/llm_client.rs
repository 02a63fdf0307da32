use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::types::{ChatRequest, ChatResponse, Message};
use serde_json::Value;
use tokio::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct LlmClient {
    url: String,
    api_key: String,
    model: String,
    max_retries: u32,
    retry_backoff: Duration,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff,
            http,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Longest a full `complete` call may take when each attempt is given
    /// `per_attempt`, counting retries and their backoff.
    pub fn retry_budget(&self, per_attempt: Duration) -> Duration {
        let backoff: Duration = (1..=self.max_retries).map(|n| self.retry_backoff * n).sum();
        per_attempt * (self.max_retries + 1) + backoff
    }

    /// Sends one completion request, retrying retryable failures up to the
    /// configured limit.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let mut attempt = 0;
        loop {
            match self.send(request).await {
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "completion request failed, retrying");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                other => return other,
            }
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "sending completion request"
        );

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let response_text = resp.text().await?;

        if !status.is_success() {
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: api_error_message(&response_text),
            });
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        // Some compatible providers report errors with a 200 status
        if let Some(error) = response_json.get("error") {
            return Err(ChatError::Api {
                status: status.as_u16(),
                message: error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.to_string()),
            });
        }

        let parsed: ChatResponse = serde_json::from_value(response_json)
            .map_err(|e| ChatError::MalformedResponse(e.to_string()))?;

        if parsed.choices.is_empty() {
            return Err(ChatError::MalformedResponse(
                "No choices in response".to_string(),
            ));
        }

        if let Some(usage) = parsed.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "completion usage"
            );
        }

        Ok(parsed)
    }
}

pub(crate) fn first_message(response: ChatResponse) -> Result<Message> {
    response
        .choices
        .into_iter()
        .next()
        .map(|c| {
            let mut message = c.message;
            // Some providers send `tool_calls: []`, which the API rejects on resubmission
            if message.tool_calls.as_ref().is_some_and(|calls| calls.is_empty()) {
                message.tool_calls = None;
            }
            message
        })
        .ok_or_else(|| ChatError::MalformedResponse("No choices in response".to_string()))
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}
