use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ChatError, Result};
use crate::types::{Message, Role};

/// Ordered, append-only conversation for a single interaction.
#[derive(Serialize, Clone, Debug)]
pub struct Transcript {
    pub id: String,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(model: Option<&str>) -> Transcript {
        Transcript {
            id: Uuid::new_v4().to_string(),
            model: model.map(|s| s.to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    pub fn with_system(model: Option<&str>, system_prompt: &str) -> Transcript {
        let mut transcript = Transcript::new(model);
        transcript.push(Message::system(system_prompt));
        transcript
    }

    // Append one message
    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
        self.updated_at = Utc::now();
    }

    pub fn push_user(&mut self, content: &str) {
        self.push(Message::user(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Ids of assistant tool calls that no later tool message answers.
    pub fn unanswered_tool_calls(&self) -> Vec<String> {
        let mut pending: Vec<String> = Vec::new();
        for m in &self.messages {
            match m.role {
                Role::Assistant => {
                    pending.extend(m.requested_tool_calls().iter().map(|tc| tc.id.clone()));
                }
                Role::Tool => {
                    if let Some(id) = &m.tool_call_id {
                        if let Some(pos) = pending.iter().position(|p| p == id) {
                            pending.remove(pos);
                        }
                    }
                }
                _ => {}
            }
        }
        pending
    }

    pub fn ensure_resubmittable(&self) -> Result<()> {
        let pending = self.unanswered_tool_calls();
        if pending.is_empty() {
            Ok(())
        } else {
            Err(ChatError::UnansweredToolCalls(pending))
        }
    }
}
