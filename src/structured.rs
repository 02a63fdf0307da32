//! JSON-constrained responses.
//!
//! `json_schema` responses are promised to match the schema by the endpoint;
//! they are still checked here since compatible providers differ in how
//! strictly they honor it. `json_object` only promises valid JSON, so any
//! shape check is ours.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::agent::Agent;
use crate::error::{ChatError, Result};
use crate::schema;
use crate::session::Transcript;
use crate::types::ResponseFormat;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReasoningAnswer {
    pub reasoning: String,
    pub answer: String,
}

pub fn reasoning_answer_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "reasoning": { "type": "string" },
            "answer": { "type": "string" }
        },
        "required": ["reasoning", "answer"],
        "additionalProperties": false
    })
}

pub async fn request_json_schema<T: DeserializeOwned>(
    agent: &Agent,
    transcript: &mut Transcript,
    name: &str,
    schema: &Value,
) -> Result<T> {
    let content = agent
        .complete_with_format(transcript, ResponseFormat::json_schema(name, schema.clone()))
        .await?;
    let value = parse_content(content)?;
    schema::validate(&value, schema).map_err(ChatError::SchemaViolation)?;
    debug!(schema = name, "structured output validated");
    serde_json::from_value(value).map_err(|e| ChatError::SchemaViolation(e.to_string()))
}

/// `json_object` mode; `schema`, when given, is enforced locally.
pub async fn request_json_object(
    agent: &Agent,
    transcript: &mut Transcript,
    schema: Option<&Value>,
) -> Result<Value> {
    let content = agent
        .complete_with_format(transcript, ResponseFormat::JsonObject)
        .await?;
    let value = parse_content(content)?;
    if let Some(schema) = schema {
        schema::validate(&value, schema).map_err(ChatError::SchemaViolation)?;
    }
    Ok(value)
}

pub async fn ask_with_reasoning(agent: &Agent, transcript: &mut Transcript) -> Result<ReasoningAnswer> {
    request_json_schema(agent, transcript, "reasoning_schema", &reasoning_answer_schema()).await
}

fn parse_content(content: Option<String>) -> Result<Value> {
    let content = content
        .ok_or_else(|| ChatError::SchemaViolation("response has no content".to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| ChatError::SchemaViolation(format!("content is not valid JSON: {}", e)))
}
