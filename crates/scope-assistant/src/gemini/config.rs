//! Gemini API client configuration.

use crate::LlmError;

pub(crate) const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }

    /// Create config from the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let key = std::env::var("GOOGLE_API_KEY").map_err(|_| {
            LlmError::ConfigError(
                "GOOGLE_API_KEY not set — required for the Gemini backend".into(),
            )
        })?;
        if key.trim().is_empty() {
            return Err(LlmError::ConfigError("GOOGLE_API_KEY is empty".into()));
        }
        Ok(Self::new(key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}
