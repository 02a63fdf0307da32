use crate::error::{ChatError, Result};
use crate::llm_client::{LlmClient, first_message};
use crate::session::Transcript;
use crate::tool_registry::{ToolOutcome, ToolRegistry};
use crate::types::{
    ChatRequest, ChatResponse, Message, ResponseFormat, ToolCall, ToolChoice, ToolDefinition,
};
use crate::utils::clip;
use async_trait::async_trait;
use tokio::time::{Duration, timeout};
use tracing::{debug, info, warn};

/// The completion endpoint as the agent sees it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClientTrait: Send + Sync {
    fn model(&self) -> String;

    /// Time allowed for one `complete` call whose attempts each get
    /// `per_attempt`. Clients that retry internally must widen it.
    fn retry_budget(&self, per_attempt: Duration) -> Duration {
        per_attempt
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

// Implement trait for real LlmClient
#[async_trait]
impl LlmClientTrait for LlmClient {
    fn model(&self) -> String {
        LlmClient::model(self).to_string()
    }

    fn retry_budget(&self, per_attempt: Duration) -> Duration {
        LlmClient::retry_budget(self, per_attempt)
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        LlmClient::complete(self, request).await
    }
}

#[derive(Clone, Debug)]
pub struct AgentOptions {
    /// Per attempt; retries configured on the client extend the total.
    pub step_timeout: Duration,
    /// Policy for the first request of a round trip. The follow-up
    /// request always uses `Auto`.
    pub tool_choice: ToolChoice,
    pub temperature: Option<f32>,
    pub log_clip: usize, // chars of tool output kept in log lines
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(120),
            tool_choice: ToolChoice::Auto,
            temperature: None,
            log_clip: 200,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExecutedToolCall {
    pub call: ToolCall,
    pub outcome: ToolOutcome,
}

/// What one round trip produced.
#[derive(Clone, Debug)]
pub struct RoundTrip {
    pub content: Option<String>,
    pub tool_calls: Vec<ExecutedToolCall>,
    pub requests: usize,
}

pub struct Agent {
    llm: Box<dyn LlmClientTrait>,
    tools: ToolRegistry,
    opts: AgentOptions,
}

impl Agent {
    pub fn new(llm: Box<dyn LlmClientTrait>, tools: ToolRegistry, opts: AgentOptions) -> Self {
        Self { llm, tools, opts }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> String {
        self.llm.model()
    }

    /// Free-text prompt: one request without tools.
    pub async fn prompt(&self, transcript: &mut Transcript) -> Result<Option<String>> {
        let reply = self.request(transcript, Vec::new(), None, None).await?;
        let content = reply.content.clone();
        transcript.push(reply);
        Ok(content)
    }

    /// One request under `format`, without tools. Returns the raw content.
    pub async fn complete_with_format(
        &self,
        transcript: &mut Transcript,
        format: ResponseFormat,
    ) -> Result<Option<String>> {
        let reply = self.request(transcript, Vec::new(), None, Some(format)).await?;
        let content = reply.content.clone();
        transcript.push(reply);
        Ok(content)
    }

    /// Request, run any requested tools, then request once more.
    ///
    /// The second response is final even if it asks for more tools; those
    /// calls are dropped from the transcript so it stays resubmittable.
    pub async fn run_round_trip(&self, transcript: &mut Transcript) -> Result<RoundTrip> {
        let first = self
            .request(
                transcript,
                self.tools.definitions(),
                Some(self.opts.tool_choice.clone()),
                None,
            )
            .await?;

        if !first.has_tool_calls() {
            debug!("no tool calls requested");
            let content = first.content.clone();
            transcript.push(first);
            return Ok(RoundTrip {
                content,
                tool_calls: Vec::new(),
                requests: 1,
            });
        }

        let calls = first.requested_tool_calls().to_vec();
        transcript.push(first);

        let mut executed = Vec::with_capacity(calls.len());
        for call in calls {
            let outcome = self.tools.dispatch(&call);
            info!(
                function = %call.function.name,
                id = %call.id,
                kind = ?outcome.kind,
                result = %clip(&outcome.result, self.opts.log_clip),
                "tool call answered"
            );
            transcript.push(Message::tool_result(&call.id, &outcome.result));
            executed.push(ExecutedToolCall { call, outcome });
        }

        let mut second = self
            .request(transcript, self.tools.definitions(), Some(ToolChoice::Auto), None)
            .await?;

        let content = second.content.clone();
        if second.has_tool_calls() {
            warn!(
                count = second.requested_tool_calls().len(),
                "ignoring tool calls in final response"
            );
            second.tool_calls = None;
            // An assistant message needs content or tool calls to be resent
            if second.content.is_none() {
                second.content = Some(String::new());
            }
        }

        transcript.push(second);

        Ok(RoundTrip {
            content,
            tool_calls: executed,
            requests: 2,
        })
    }

    async fn request(
        &self,
        transcript: &Transcript,
        tools: Vec<ToolDefinition>,
        tool_choice: Option<ToolChoice>,
        response_format: Option<ResponseFormat>,
    ) -> Result<Message> {
        transcript.ensure_resubmittable()?;

        let mut request =
            ChatRequest::new(self.llm.model(), transcript.messages().to_vec()).with_tools(tools);
        if !request.tools.is_empty() {
            request.tool_choice = tool_choice;
        }
        request.response_format = response_format;
        request.temperature = self.opts.temperature;

        let budget = self.llm.retry_budget(self.opts.step_timeout);
        let response = timeout(budget, self.llm.complete(&request))
            .await
            .map_err(|_| ChatError::Timeout(budget))??;

        first_message(response)
    }
}
