//! AI provider configuration and environment variable detection.
//!
//! API keys are detected with the `QUICKNOTES_` prefix:
//! - `QUICKNOTES_OPENAI_API_KEY` -> OpenAI provider
//! - `QUICKNOTES_GOOGLE_API_KEY` -> Google (Gemini) provider
//!
//! The prefix ensures users configure keys for this app explicitly rather
//! than accidentally exposing keys meant for other tools.

use std::env;

/// A configured AI provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Unique identifier for the provider (e.g., "openai", "google")
    pub provider_id: String,
    /// Human-readable name (e.g., "OpenAI", "Google")
    pub display_name: String,
    /// The API key (never log or display this)
    api_key: String,
    /// Base URL override for proxies and compatible endpoints
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(
        provider_id: impl Into<String>,
        display_name: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            display_name: display_name.into(),
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Get the API key for making requests. Returns a reference to avoid
    /// accidental copies; never log the returned value.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_valid_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Environment variable names for API keys.
pub mod env_vars {
    /// OpenAI API key environment variable
    pub const OPENAI_API_KEY: &str = "QUICKNOTES_OPENAI_API_KEY";
    /// Google AI (Gemini) API key environment variable
    pub const GOOGLE_API_KEY: &str = "QUICKNOTES_GOOGLE_API_KEY";
}

/// API keys found in the environment.
#[derive(Debug, Default)]
pub struct DetectedKeys {
    pub openai: Option<String>,
    pub google: Option<String>,
}

impl DetectedKeys {
    /// Scan environment variables for API keys.
    pub fn from_environment() -> Self {
        Self {
            openai: env::var(env_vars::OPENAI_API_KEY)
                .ok()
                .filter(|s| !s.is_empty()),
            google: env::var(env_vars::GOOGLE_API_KEY)
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn has_any(&self) -> bool {
        self.openai.is_some() || self.google.is_some()
    }

    /// Provider names with keys configured, for logging. Never includes
    /// the keys themselves.
    pub fn available_providers(&self) -> Vec<&'static str> {
        let mut providers = Vec::new();
        if self.openai.is_some() {
            providers.push("OpenAI");
        }
        if self.google.is_some() {
            providers.push("Google");
        }
        providers
    }
}
