//! Model Provider Abstraction
//!
//! The generation endpoint is an external collaborator: submit a prompt, receive
//! text, or fail. Clients share one trait so the pipeline takes any provider (or a
//! test double) as a passed-in handle.

use crate::error::ApiError;
use crate::synthesis::GenerationRequest;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported generation backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    #[serde(rename = "openai")]
    #[value(name = "openai")]
    OpenAI,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAI => "openai",
        }
    }

    /// Model used when neither the command line nor config names one
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-3.1-pro-preview",
            ProviderKind::OpenAI => "gpt-4o-mini",
        }
    }

    /// Environment variable holding the credential
    pub fn credential_env(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GOOGLE_GEMINI_API_KEY",
            ProviderKind::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::Gemini
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAI),
            other => Err(ApiError::ProviderNotConfigured(format!(
                "Unknown provider: {} (available: gemini, openai)",
                other
            ))),
        }
    }
}

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    Gemini {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // For OpenAI-compatible endpoints
    },
}

impl ModelProvider {
    pub fn new(kind: ProviderKind, model: String, api_key: String, base_url: Option<String>) -> Self {
        match kind {
            ProviderKind::Gemini => ModelProvider::Gemini {
                model,
                api_key,
                base_url,
            },
            ProviderKind::OpenAI => ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            },
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ModelProvider::Gemini { .. } => ProviderKind::Gemini,
            ModelProvider::OpenAI { .. } => ProviderKind::OpenAI,
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ModelProvider::Gemini { model, .. } | ModelProvider::OpenAI { model, .. } => model,
        }
    }
}

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Completion options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,  // 0.0-2.0
    pub max_tokens: Option<u32>,   // Maximum tokens to generate
    pub top_p: Option<f32>,        // Nucleus sampling
    pub stop: Option<Vec<String>>, // Stop sequences
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(1.0),
            max_tokens: None,
            top_p: None,
            stop: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;

    /// Submit one generation request and return the raw response text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ApiError> {
        let response = self
            .complete(request.messages(), request.completion_options())
            .await?;
        Ok(response.content)
    }
}

// Helper function to map HTTP errors to ApiError
fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        status_error(status, &error.to_string())
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

fn status_error(status: StatusCode, detail: &str) -> ApiError {
    match status.as_u16() {
        401 | 403 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", detail)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", detail)),
        404 => ApiError::ProviderModelNotFound(format!("Model not found: {}", detail)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, detail
        )),
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(status_error(status, &error_text))
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}

// Gemini generateContent request/response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

fn gemini_request(messages: Vec<ChatMessage>, options: CompletionOptions) -> GeminiRequest {
    let mut system_instruction = None;
    let mut contents = Vec::new();
    for message in messages {
        let part = GeminiPart {
            text: message.content,
        };
        match message.role {
            MessageRole::System => {
                system_instruction = Some(GeminiContent {
                    role: None,
                    parts: vec![part],
                })
            }
            MessageRole::User => contents.push(GeminiContent {
                role: Some("user".to_string()),
                parts: vec![part],
            }),
            MessageRole::Assistant => contents.push(GeminiContent {
                role: Some("model".to_string()),
                parts: vec![part],
            }),
        }
    }

    GeminiRequest {
        contents,
        system_instruction,
        generation_config: GeminiGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
            top_p: options.top_p,
            stop_sequences: options.stop,
        },
    }
}

fn gemini_completion(response: GeminiResponse, model: &str) -> Result<CompletionResponse, ApiError> {
    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no candidates".to_string());
            return Err(ApiError::ProviderError(format!(
                "No candidates in response: {}",
                reason
            )));
        }
    };

    let content = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let usage = response
        .usage_metadata
        .map(|usage| TokenUsage {
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        content,
        model: response.model_version.unwrap_or_else(|| model.to_string()),
        usage,
        finish_reason: candidate.finish_reason,
    })
}

/// Google Gemini provider client
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        let base_url = base_url
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());

        Ok(Self {
            client,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ModelProviderClient for GeminiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let request = gemini_request(messages, options);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = error_for_status(response).await?;

        let completion: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        gemini_completion(completion, &self.model)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// OpenAI-compatible API request/response structures
#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
    stream: bool,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

// Helper function to convert MessageRole to string
fn role_to_string(role: MessageRole) -> &'static str {
    match role {
        MessageRole::System => "system",
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

/// OpenAI provider client
pub struct OpenAIClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Result<Self, ApiError> {
        let client = build_provider_http_client()?;
        let base_url = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OpenAIClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let openai_messages: Vec<OpenAIMessage> = messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: role_to_string(msg.role).to_string(),
                content: Some(msg.content),
            })
            .collect();

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: openai_messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            stop: options.stop,
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_http_error)?;
        let response = error_for_status(response).await?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::ProviderError("No choices in response".to_string()))?;

        let usage = completion.usage.unwrap_or(Usage {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
        });

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            model: completion.model,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
            finish_reason: choice.finish_reason,
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
    ) -> Result<Box<dyn ModelProviderClient>, ApiError> {
        match provider {
            ModelProvider::Gemini {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(GeminiClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAIClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?)),
        }
    }
}

// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    responses: Vec<Result<String, String>>,
    current: std::sync::Arc<std::sync::Mutex<usize>>,
    model_name: String,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(model_name: String, responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses,
            current: std::sync::Arc::new(std::sync::Mutex::new(0)),
            model_name,
        }
    }

    /// Replies with `response` to every call
    pub fn always(response: &str) -> Self {
        Self::new("mock-model".to_string(), vec![Ok(response.to_string())])
    }

    pub fn calls(&self) -> usize {
        *self.current.lock().unwrap()
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, ApiError> {
        let response = {
            let mut idx = self.current.lock().unwrap();
            // The last scripted response repeats once the script runs out.
            let slot = (*idx).min(self.responses.len().saturating_sub(1));
            *idx += 1;
            self.responses
                .get(slot)
                .cloned()
                .unwrap_or_else(|| Ok("Mock response".to_string()))
        };

        let content = response.map_err(ApiError::ProviderRequestFailed)?;
        Ok(CompletionResponse {
            content,
            model: self.model_name.clone(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
