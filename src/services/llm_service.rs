use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// System instruction sent with every completion so answers come back as markdown.
const MARKDOWN_INSTRUCTION: &str = "Use markdown to format your answers.";

#[derive(Debug)]
pub enum LlmError {
    EnvironmentError(String),
    HttpError(reqwest::Error),
    ResponseError(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::EnvironmentError(msg) => write!(f, "Environment error: {}", msg),
            LlmError::HttpError(err) => write!(f, "HTTP error: {}", err),
            LlmError::ResponseError(msg) => write!(f, "Response error: {}", msg),
        }
    }
}

impl Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError(err)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage::system(MARKDOWN_INSTRUCTION),
                ChatMessage::user(prompt),
            ],
            stream: false,
            max_tokens: None,
        }
    }
}

/// Remote chat-completion provider.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GroqConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GroqConfig {
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = env::var("GROQ_API_KEY")
            .map_err(|_| LlmError::EnvironmentError("GROQ_API_KEY not set".to_string()))?;
        let base_url = env::var("GROQ_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self { api_key, base_url })
    }
}

/// Groq's OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct GroqGateway {
    client: Client,
    config: GroqConfig,
}

impl GroqGateway {
    pub fn new() -> Result<Self, LlmError> {
        Ok(Self::with_config(GroqConfig::from_env()?))
    }

    pub fn with_config(config: GroqConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl LlmGateway for GroqGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        info!("Delegating to Groq for completion");
        debug!(
            "Model: {}, stream: {}, max_tokens: {:?}",
            request.model, request.stream, request.max_tokens
        );

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Groq request failed with status {}: {}", status, error_text);
            return Err(LlmError::ResponseError(format!(
                "Completion request failed with status {}",
                status
            )));
        }

        if request.stream {
            let body = response.text().await?;
            return collect_stream(&body);
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ResponseError(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmError::ResponseError("Completion had no choices".to_string()))
    }
}

/// Joins the delta contents of a server-sent-event completion body.
fn collect_stream(body: &str) -> Result<String, LlmError> {
    let mut content = String::new();

    for line in body.lines() {
        let Some(data) = line.trim().strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data == "[DONE]" {
            break;
        }
        let chunk: StreamChunk = serde_json::from_str(data)
            .map_err(|e| LlmError::ResponseError(format!("Invalid stream chunk: {}", e)))?;
        for choice in chunk.choices {
            if let Some(delta) = choice.delta.content {
                content.push_str(&delta);
            }
        }
    }

    Ok(content)
}
