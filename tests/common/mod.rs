use serde_json::{Value, json};
use toolcall::Config;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_KEY: &str = "sk-test-key";

/// Mock completion endpoint shared by the HTTP-level tests.
pub struct CompletionServer {
    pub server: MockServer,
}

impl CompletionServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn config(&self) -> Config {
        let base_url = format!("{}/v1", self.server.uri());
        Config::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some(TEST_KEY.to_string()),
            "OPENAI_BASE_URL" => Some(base_url.clone()),
            "OPENAI_MODEL" => Some("gpt-test".to_string()),
            _ => None,
        })
        .expect("test config")
    }

    fn completions() -> wiremock::MockBuilder {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", format!("Bearer {}", TEST_KEY).as_str()))
    }

    pub async fn reply_text(&self, content: &str) {
        Self::completions()
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": content
            }), "stop")))
            .mount(&self.server)
            .await;
    }

    /// Answers the first request with a tool call and any request that
    /// carries a tool result with `final_text`.
    pub async fn reply_tool_call_then_text(&self, name: &str, arguments: &str, final_text: &str) {
        Self::completions()
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_weather_1",
                    "type": "function",
                    "function": { "name": name, "arguments": arguments }
                }]
            }), "tool_calls")))
            .up_to_n_times(1)
            .mount(&self.server)
            .await;

        Self::completions()
            .and(body_string_contains("tool_call_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!({
                "role": "assistant",
                "content": final_text
            }), "stop")))
            .mount(&self.server)
            .await;
    }

    pub async fn reply_status(&self, status: u16, body: Value, times: u64) {
        Self::completions()
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    pub async fn reply_status_after(&self, status: u16, body: Value, delay: std::time::Duration) {
        Self::completions()
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(body)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn request_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.body_json::<Value>().expect("request body is JSON"))
            .collect()
    }
}

pub fn completion(message: Value, finish_reason: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-test",
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": finish_reason
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 7, "total_tokens": 19 }
    })
}
