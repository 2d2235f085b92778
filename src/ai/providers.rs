//! AI provider abstraction layer.
//!
//! A trait-based seam over hosted text-generation APIs. Each provider
//! turns the chat transcript into its wire format, streams the response
//! over SSE, and hands text fragments to the caller one at a time. The
//! stream is lazy, finite, and non-restartable; the only failure handling
//! is letting the request fail.
//!
//! # Usage
//!
//! ```rust,ignore
//! let registry = ProviderRegistry::from_environment();
//! if let Some(provider) = registry.get_provider("openai") {
//!     provider.stream_message(&messages, provider.default_model(), Box::new(|chunk| {
//!         print!("{chunk}");
//!     }))?;
//! }
//! ```

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::sync::Arc;

use anyhow::{Context, Result};

use super::config::{DetectedKeys, ProviderConfig};
use super::model::{ChatMessage, ContentPart, MessageContent, MessageRole};

/// Callback type for streaming responses.
pub type StreamCallback = Box<dyn Fn(String) + Send + Sync>;

/// Interface every AI provider implements.
pub trait AiProvider: Send + Sync {
    /// Unique identifier for this provider (e.g., "openai", "google").
    fn provider_id(&self) -> &str;

    /// Human-readable display name (e.g., "OpenAI", "Google").
    fn display_name(&self) -> &str;

    /// The model used when the caller doesn't pick one.
    fn default_model(&self) -> &str;

    /// Send the conversation and stream the response.
    ///
    /// `on_chunk` is invoked once per text fragment, in order. Returns
    /// Ok(()) after the stream ends, or the first error encountered.
    fn stream_message(
        &self,
        messages: &[ChatMessage],
        model_id: &str,
        on_chunk: StreamCallback,
    ) -> Result<()>;
}

/// OpenAI provider (chat completions API).
pub struct OpenAiProvider {
    config: ProviderConfig,
}

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_DEFAULT_MODEL: &str = "gpt-5";

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new("openai", "OpenAI", api_key),
        }
    }

    /// Create with a custom base URL (for proxies or compatible endpoints).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new("openai", "OpenAI", api_key).with_base_url(base_url),
        }
    }

    fn api_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(OPENAI_API_URL)
    }

    /// Build the request body for the chat completions API.
    fn build_request_body(&self, messages: &[ChatMessage], model_id: &str) -> serde_json::Value {
        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_str(),
                    "content": Self::content_json(&m.content)
                })
            })
            .collect();

        serde_json::json!({
            "model": model_id,
            "stream": true,
            "messages": api_messages
        })
    }

    /// Plain text stays a string; multimodal content becomes the part
    /// array form with images as data URLs.
    fn content_json(content: &MessageContent) -> serde_json::Value {
        match content {
            MessageContent::Text(text) => serde_json::json!(text),
            MessageContent::Parts(parts) => {
                let parts: Vec<serde_json::Value> = parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => {
                            serde_json::json!({"type": "text", "text": text})
                        }
                        ContentPart::Image { image } => serde_json::json!({
                            "type": "image_url",
                            "image_url": {"url": format!("data:image/png;base64,{}", image)}
                        }),
                    })
                    .collect();
                serde_json::json!(parts)
            }
        }
    }

    /// Parse an SSE line and extract the content delta.
    fn parse_sse_line(line: &str) -> Option<String> {
        // SSE format: "data: {json}"
        let json_str = line.strip_prefix("data: ")?;

        // Check for stream end
        if json_str == "[DONE]" {
            return None;
        }

        let parsed: serde_json::Value = serde_json::from_str(json_str).ok()?;

        // Streaming format: {"choices": [{"delta": {"content": "..."}}]}
        parsed
            .get("choices")?
            .as_array()?
            .first()?
            .get("delta")?
            .get("content")?
            .as_str()
            .map(|s| s.to_string())
    }
}

impl AiProvider for OpenAiProvider {
    fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn default_model(&self) -> &str {
        OPENAI_DEFAULT_MODEL
    }

    fn stream_message(
        &self,
        messages: &[ChatMessage],
        model_id: &str,
        on_chunk: StreamCallback,
    ) -> Result<()> {
        let body = self.build_request_body(messages, model_id);

        tracing::debug!(
            model = model_id,
            message_count = messages.len(),
            "Starting streaming request to OpenAI"
        );

        let response = ureq::post(self.api_url())
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                &format!("Bearer {}", self.config.api_key()),
            )
            .header("Accept", "text/event-stream")
            .send_json(&body)
            .context("Failed to send streaming request to OpenAI API")?;

        // Read the SSE stream
        let reader = BufReader::new(response.into_body().into_reader());

        for line in reader.lines() {
            let line = line.context("Failed to read SSE line")?;

            // Blank lines are SSE event separators
            if line.is_empty() {
                continue;
            }

            if let Some(text) = Self::parse_sse_line(&line) {
                on_chunk(text);
            }
        }

        tracing::debug!("Completed streaming response from OpenAI");

        Ok(())
    }
}

/// Google (Gemini) provider.
pub struct GoogleProvider {
    config: ProviderConfig,
}

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GOOGLE_DEFAULT_MODEL: &str = "gemini-2.5-pro";

impl GoogleProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            config: ProviderConfig::new("google", "Google", api_key),
        }
    }

    fn api_url(&self, model_id: &str) -> String {
        let base = self.config.base_url.as_deref().unwrap_or(GOOGLE_API_BASE);
        format!("{}/{}:streamGenerateContent?alt=sse", base, model_id)
    }

    /// Build the request body for the Gemini API.
    ///
    /// System messages become the `systemInstruction` field; the
    /// assistant role maps to Gemini's "model" role.
    fn build_request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        let system_text = messages
            .iter()
            .find(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_text());

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| {
                let role = match m.role {
                    MessageRole::Assistant => "model",
                    _ => "user",
                };
                serde_json::json!({
                    "role": role,
                    "parts": Self::parts_json(&m.content)
                })
            })
            .collect();

        let mut body = serde_json::json!({ "contents": contents });

        if let Some(system) = system_text {
            body["systemInstruction"] = serde_json::json!({ "parts": [{ "text": system }] });
        }

        body
    }

    fn parts_json(content: &MessageContent) -> serde_json::Value {
        match content {
            MessageContent::Text(text) => serde_json::json!([{ "text": text }]),
            MessageContent::Parts(parts) => {
                let parts: Vec<serde_json::Value> = parts
                    .iter()
                    .map(|part| match part {
                        ContentPart::Text { text } => serde_json::json!({ "text": text }),
                        ContentPart::Image { image } => serde_json::json!({
                            "inline_data": {"mime_type": "image/png", "data": image}
                        }),
                    })
                    .collect();
                serde_json::json!(parts)
            }
        }
    }

    /// Parse an SSE line and extract the text delta.
    fn parse_sse_line(line: &str) -> Option<String> {
        let json_str = line.strip_prefix("data: ")?;

        if json_str == "[DONE]" {
            return None;
        }

        let parsed: serde_json::Value = serde_json::from_str(json_str).ok()?;

        // Streaming format:
        // {"candidates": [{"content": {"parts": [{"text": "..."}]}}]}
        parsed
            .get("candidates")?
            .as_array()?
            .first()?
            .get("content")?
            .get("parts")?
            .as_array()?
            .first()?
            .get("text")?
            .as_str()
            .map(|s| s.to_string())
    }
}

impl AiProvider for GoogleProvider {
    fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn default_model(&self) -> &str {
        GOOGLE_DEFAULT_MODEL
    }

    fn stream_message(
        &self,
        messages: &[ChatMessage],
        model_id: &str,
        on_chunk: StreamCallback,
    ) -> Result<()> {
        let body = self.build_request_body(messages);

        tracing::debug!(
            model = model_id,
            message_count = messages.len(),
            "Starting streaming request to Gemini"
        );

        let response = ureq::post(&self.api_url(model_id))
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", self.config.api_key())
            .header("Accept", "text/event-stream")
            .send_json(&body)
            .context("Failed to send streaming request to Gemini API")?;

        let reader = BufReader::new(response.into_body().into_reader());

        for line in reader.lines() {
            let line = line.context("Failed to read SSE line")?;

            if line.is_empty() {
                continue;
            }

            if let Some(text) = Self::parse_sse_line(&line) {
                on_chunk(text);
            }
        }

        tracing::debug!("Completed streaming response from Gemini");

        Ok(())
    }
}

/// Registry of available AI providers.
///
/// Discovers providers from environment variables and hands out a unified
/// interface to whichever ones have credentials.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn AiProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Create a registry populated from environment variables.
    pub fn from_environment() -> Self {
        let keys = DetectedKeys::from_environment();
        let mut registry = Self::new();

        if let Some(key) = keys.openai {
            registry.register(Arc::new(OpenAiProvider::new(key)));
        }

        if let Some(key) = keys.google {
            registry.register(Arc::new(GoogleProvider::new(key)));
        }

        // Log which providers are available (without exposing keys)
        let available: Vec<_> = registry.providers.keys().collect();
        if !available.is_empty() {
            tracing::info!(
                providers = ?available,
                "AI providers initialized from environment"
            );
        } else {
            tracing::debug!("No AI provider API keys found in environment");
        }

        registry
    }

    /// Register a provider with the registry.
    pub fn register(&mut self, provider: Arc<dyn AiProvider>) {
        self.providers
            .insert(provider.provider_id().to_string(), provider);
    }

    /// Check if any providers are available.
    pub fn has_any_provider(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Get a provider by ID.
    pub fn get_provider(&self, id: &str) -> Option<&Arc<dyn AiProvider>> {
        self.providers.get(id)
    }

    /// All registered provider IDs.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
