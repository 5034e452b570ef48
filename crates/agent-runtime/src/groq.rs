//! Groq LLM Provider
//!
//! Implementation of `LlmProvider` over Groq's OpenAI-compatible
//! chat-completions API, including SSE token streaming.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, CompletionStream, FinishReason, GenerationOptions, LlmProvider, StreamChunk,
        TokenUsage,
    },
};
use async_stream::try_stream;
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// The four models this application offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroqModel {
    Gemma2_9bIt,
    Llama3_8b,
    Llama3_70b,
    Mixtral8x7b,
}

impl GroqModel {
    pub const ALL: [GroqModel; 4] = [
        GroqModel::Gemma2_9bIt,
        GroqModel::Llama3_8b,
        GroqModel::Llama3_70b,
        GroqModel::Mixtral8x7b,
    ];

    /// Wire identifier sent to the API
    pub fn id(self) -> &'static str {
        match self {
            GroqModel::Gemma2_9bIt => "gemma2-9b-it",
            GroqModel::Llama3_8b => "llama3-8b-8192",
            GroqModel::Llama3_70b => "llama3-70b-8192",
            GroqModel::Mixtral8x7b => "mixtral-8x7b-32768",
        }
    }

    /// Human label shown in the model selector
    pub fn label(self) -> &'static str {
        match self {
            GroqModel::Gemma2_9bIt => "Gemma 2 9B (Fast)",
            GroqModel::Llama3_8b => "Llama 3 8B (Balanced)",
            GroqModel::Llama3_70b => "Llama 3 70B (Powerful)",
            GroqModel::Mixtral8x7b => "Mixtral 8x7B (Comprehensive)",
        }
    }

    /// Parse a wire identifier; unknown ids map to `None`
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.id() == id)
    }
}

impl Default for GroqModel {
    fn default() -> Self {
        GroqModel::Gemma2_9bIt
    }
}

impl std::fmt::Display for GroqModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ============================================================================
// Wire types (OpenAI-compatible)
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<WireUsage> for TokenUsage {
    fn from(u: WireUsage) -> Self {
        TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: Delta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ============================================================================
// Provider
// ============================================================================

/// Groq provider. Constructed fresh per solve request from the viewer's key.
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
}

impl GroqProvider {
    /// Create a provider. An empty key is a configuration error and halts
    /// the request pipeline before any network traffic.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AgentError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_base: GROQ_API_BASE.into(),
        })
    }

    /// Point the provider at another OpenAI-compatible endpoint
    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Result<Self> {
        let mut provider = Self::new(api_key)?;
        provider.api_base = api_base.into();
        Ok(provider)
    }

    /// Convert solver messages to the wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    // Tool observations travel as user context; the wire
                    // "tool" role requires native tool-call bookkeeping.
                    Role::Tool => "user",
                };
                WireMessage {
                    role,
                    content: m.content.clone(),
                }
            })
            .collect()
    }

    fn build_request<'a>(
        messages: &[Message],
        options: &'a GenerationOptions,
        stream: bool,
    ) -> ChatRequest<'a> {
        ChatRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stream,
        }
    }

    fn convert_finish_reason(reason: Option<&str>) -> Option<FinishReason> {
        match reason {
            Some("stop") => Some(FinishReason::Stop),
            Some("length") => Some(FinishReason::Length),
            Some("content_filter") => Some(FinishReason::ContentFilter),
            Some(_) => Some(FinishReason::Error),
            None => None,
        }
    }

    /// Map a non-success HTTP response to an error
    async fn error_from_response(response: reqwest::Response) -> AgentError {
        let status = response.status();
        let message = response
            .json::<ApiError>()
            .await
            .map(|e| e.error.message)
            .unwrap_or_else(|_| status.to_string());

        if status.as_u16() == 429 {
            AgentError::RateLimited(message)
        } else if status.is_server_error() {
            AgentError::ProviderUnavailable(message)
        } else {
            AgentError::Provider(message)
        }
    }

    async fn post_chat(&self, body: &ChatRequest<'_>) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        Ok(response)
    }
}

/// Extract the payload of an SSE `data:` line, if it is one
fn parse_sse_data(line: &str) -> Option<&str> {
    line.trim().strip_prefix("data:").map(str::trim)
}

/// Decode one streamed JSON payload into a chunk
fn decode_stream_payload(payload: &str) -> Result<StreamChunk> {
    let response: StreamResponse = serde_json::from_str(payload)?;

    let (delta, done) = response
        .choices
        .first()
        .map(|c| {
            (
                c.delta.content.clone().unwrap_or_default(),
                c.finish_reason.is_some(),
            )
        })
        .unwrap_or((String::new(), false));

    Ok(StreamChunk {
        delta,
        done,
        usage: None,
    })
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(format!("{}/models", self.api_base))
            .bearer_auth(&self.api_key)
            .send()
            .await;

        match response {
            Ok(r) => Ok(r.status().is_success()),
            Err(e) => {
                tracing::warn!("Groq health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = Self::build_request(messages, options, false);
        let response = self.post_chat(&body).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("malformed response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model.unwrap_or_else(|| options.model.clone()),
            usage: parsed.usage.map(TokenUsage::from),
            finish_reason: Self::convert_finish_reason(choice.finish_reason.as_deref()),
        })
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<CompletionStream> {
        let body = Self::build_request(messages, options, true);
        let response = self.post_chat(&body).await?;

        let mut bytes = response.bytes_stream();

        let stream = try_stream! {
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = chunk.map_err(|e| AgentError::Provider(e.to_string()))?;
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].to_string();
                    buffer.drain(..=pos);

                    let Some(payload) = parse_sse_data(&line) else {
                        continue;
                    };

                    if payload == "[DONE]" {
                        yield StreamChunk {
                            delta: String::new(),
                            done: true,
                            usage: None,
                        };
                        return;
                    }

                    yield decode_stream_payload(payload)?;
                }
            }
        };

        Ok(Box::pin(stream))
    }

    fn estimate_tokens(&self, text: &str) -> u32 {
        // Rough estimate of ~4 chars per token
        (text.len() / 4) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_catalog() {
        assert_eq!(GroqModel::ALL.len(), 4);
        assert_eq!(GroqModel::Gemma2_9bIt.id(), "gemma2-9b-it");
        assert_eq!(GroqModel::from_id("llama3-70b-8192"), Some(GroqModel::Llama3_70b));
        assert_eq!(GroqModel::from_id("gpt-4"), None);
        assert_eq!(GroqModel::default(), GroqModel::Gemma2_9bIt);
    }

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            GroqProvider::new("  "),
            Err(AgentError::MissingApiKey)
        ));
        assert!(GroqProvider::new("gsk_test").is_ok());
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are a math tutor."),
            Message::user("Hello"),
            Message::tool("[Tool 'wikipedia' returned]\n..."),
        ];

        let converted = GroqProvider::convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[2].role, "user");
    }

    #[test]
    fn test_parse_sse_data() {
        assert_eq!(parse_sse_data("data: {\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(parse_sse_data("data: [DONE]"), Some("[DONE]"));
        assert_eq!(parse_sse_data(": keepalive"), None);
        assert_eq!(parse_sse_data(""), None);
    }

    #[test]
    fn test_decode_stream_payload() {
        let payload = r#"{"choices":[{"delta":{"content":"4"},"finish_reason":null}]}"#;
        let chunk = decode_stream_payload(payload).unwrap();
        assert_eq!(chunk.delta, "4");
        assert!(!chunk.done);

        let last = r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#;
        let chunk = decode_stream_payload(last).unwrap();
        assert_eq!(chunk.delta, "");
        assert!(chunk.done);
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(
            GroqProvider::convert_finish_reason(Some("stop")),
            Some(FinishReason::Stop)
        );
        assert_eq!(
            GroqProvider::convert_finish_reason(Some("length")),
            Some(FinishReason::Length)
        );
        assert_eq!(GroqProvider::convert_finish_reason(None), None);
    }
}
