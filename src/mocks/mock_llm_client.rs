use crate::agent::LlmClientTrait;
use crate::error::{ChatError, Result};
use crate::types::{ChatRequest, ChatResponse, Choice, FunctionCall, Message, Role, ToolCall};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

enum Scripted {
    Reply(Message),
    Fail(ChatError),
}

/// Replays queued replies in order and records every request it receives.
#[derive(Clone)]
pub struct MockLlmClient {
    responses: Arc<Mutex<Vec<Scripted>>>,
    call_history: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_text_response(&mut self, content: &str) {
        self.push(Scripted::Reply(Message::assistant(content)));
    }

    pub fn add_tool_call_response(&mut self, id: &str, tool_name: &str, args: &str) {
        self.add_tool_calls_response(&[(id, tool_name, args)]);
    }

    pub fn add_tool_calls_response(&mut self, calls: &[(&str, &str, &str)]) {
        let tool_calls = calls
            .iter()
            .map(|(id, name, args)| ToolCall {
                id: id.to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: name.to_string(),
                    arguments: args.to_string(),
                },
            })
            .collect();

        self.push(Scripted::Reply(Message {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }));
    }

    pub fn add_error_response(&mut self, error: ChatError) {
        self.push(Scripted::Fail(error));
    }

    pub fn get_call_history(&self) -> Vec<ChatRequest> {
        self.call_history.lock().unwrap().clone()
    }

    fn push(&self, scripted: Scripted) {
        self.responses.lock().unwrap().push(scripted);
    }

    fn pop_response(&self) -> Scripted {
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Scripted::Reply(Message::assistant("No more mock responses configured"))
        } else {
            responses.remove(0)
        }
    }
}

#[async_trait]
impl LlmClientTrait for MockLlmClient {
    fn model(&self) -> String {
        "mock-model".to_string()
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        // Store the call for verification
        self.call_history.lock().unwrap().push(request.clone());

        match self.pop_response() {
            Scripted::Reply(message) => Ok(ChatResponse {
                id: Some("chatcmpl-mock".to_string()),
                model: Some(self.model()),
                choices: vec![Choice {
                    index: 0,
                    finish_reason: Some(
                        if message.has_tool_calls() { "tool_calls" } else { "stop" }.to_string(),
                    ),
                    message,
                }],
                usage: None,
            }),
            Scripted::Fail(error) => Err(error),
        }
    }
}
