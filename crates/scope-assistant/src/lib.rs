//! Conversational assistant core for the SCOPE complaint-tracking service.
//!
//! Turns one free-text staff message into zero or more structured tool
//! invocations against the complaint store and a final natural-language
//! answer, with:
//! - Multi-turn session history
//! - A bounded tool-call loop
//! - Tool-level and backend-level failure containment
//! - A permanent degraded mode when the backend cannot be constructed

pub mod classify;
pub mod engine;
pub mod gemini;
pub mod sanitize;
pub mod session;
pub mod store;
pub mod tools;

use async_trait::async_trait;

pub use engine::{AssistantEngine, EngineHandle, FallbackEngine, MessageProcessor};
pub use gemini::{GeminiClient, GeminiConfig};
pub use session::{ChatOutcome, Session, SessionStore, Turn, TurnRole};
pub use store::{ComplaintStore, MemoryStore, SearchHit, SimilaritySearch, StatusChange};
pub use tools::{Tool, ToolRegistry};

/// The language-generation backend boundary. Per loop iteration the backend
/// either answers in plain text or requests one or more tool calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, LlmError>;
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

/// A named tool as advertised to the backend: stable name, natural-language
/// description, and a JSON-schema object describing the arguments.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
