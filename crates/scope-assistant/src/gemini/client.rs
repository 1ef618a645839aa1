//! Gemini client struct, request building, and response parsing.

use crate::{LlmError, LlmResponse, Message, Role, TokenUsage, ToolCall, ToolDefinition};

use super::config::GeminiConfig;

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Construct from `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self, LlmError> {
        Ok(Self::new(GeminiConfig::from_env()?))
    }

    pub(crate) fn api_url(&self) -> String {
        format!("{}/{}:generateContent", GEMINI_API_BASE, self.config.model)
    }

    /// Build the JSON request body for the `generateContent` API.
    ///
    /// Tool results ride as user-role context parts; the system message
    /// becomes `systemInstruction`.
    pub(crate) fn build_request_body(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> serde_json::Value {
        let mut contents = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::User | Role::Tool => "user",
                Role::Assistant => "model",
                Role::System => continue, // handled via systemInstruction
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }]
            }));
        }

        let mut body = serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if let Some(system) = messages.iter().find(|m| m.role == Role::System) {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": system.content }]
            });
        }

        if !tools.is_empty() {
            let declarations: Vec<_> = tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = serde_json::json!([{
                "functionDeclarations": declarations
            }]);
        }

        body
    }

    /// Parse a `generateContent` response into text + tool calls.
    pub(crate) fn parse_response(&self, json: serde_json::Value) -> Result<LlmResponse, LlmError> {
        let candidates = json["candidates"]
            .as_array()
            .ok_or_else(|| LlmError::ParseError("no candidates in response".to_string()))?;

        let first = candidates
            .first()
            .ok_or_else(|| LlmError::ParseError("empty candidates".to_string()))?;

        let parts = first["content"]["parts"]
            .as_array()
            .cloned()
            .unwrap_or_default();

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        for part in &parts {
            if let Some(text) = part["text"].as_str() {
                content.push_str(text);
            }
            if let Some(fc) = part.get("functionCall") {
                tool_calls.push(ToolCall {
                    id: scope_common::new_id(),
                    name: fc["name"].as_str().unwrap_or("").to_string(),
                    arguments: fc["args"].clone(),
                });
            }
        }

        let usage = TokenUsage {
            input_tokens: json["usageMetadata"]["promptTokenCount"]
                .as_u64()
                .unwrap_or(0),
            output_tokens: json["usageMetadata"]["candidatesTokenCount"]
                .as_u64()
                .unwrap_or(0),
        };

        Ok(LlmResponse {
            content,
            tool_calls,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig::new("test-key"))
    }

    fn definition() -> ToolDefinition {
        ToolDefinition {
            name: "get_complaint".into(),
            description: "Get details about a specific complaint by ID".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "complaint_id": { "type": "integer", "description": "The complaint ID" }
                },
                "required": ["complaint_id"]
            }),
        }
    }

    #[test]
    fn request_body_maps_roles() {
        let messages = vec![
            Message {
                role: Role::System,
                content: "You are SCOPE Assistant".into(),
            },
            Message {
                role: Role::User,
                content: "show me complaint #42".into(),
            },
            Message {
                role: Role::Assistant,
                content: "Looking it up".into(),
            },
            Message {
                role: Role::Tool,
                content: "[Tool Result: get_complaint]\n### Complaint #42".into(),
            },
        ];
        let body = client().build_request_body(&messages, &[]);

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3); // system message is not a content entry
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user"); // tool results ride as user context
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are SCOPE Assistant"
        );
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn request_body_includes_function_declarations() {
        let messages = vec![Message {
            role: Role::User,
            content: "hi".into(),
        }];
        let body = client().build_request_body(&messages, &[definition()]);

        let declarations = body["tools"][0]["functionDeclarations"].as_array().unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0]["name"], "get_complaint");
        assert_eq!(
            declarations[0]["parameters"]["required"][0],
            "complaint_id"
        );
    }

    #[test]
    fn parse_response_extracts_text() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Complaint #42 is Pending." }] }
            }],
            "usageMetadata": { "promptTokenCount": 120, "candidatesTokenCount": 15 }
        });
        let response = client().parse_response(json).unwrap();
        assert_eq!(response.content, "Complaint #42 is Pending.");
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.total_tokens(), 135);
    }

    #[test]
    fn parse_response_extracts_function_calls() {
        let json = serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "functionCall": { "name": "get_complaint", "args": { "complaint_id": 42 } } }
                ]}
            }]
        });
        let response = client().parse_response(json).unwrap();
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "get_complaint");
        assert_eq!(response.tool_calls[0].arguments["complaint_id"], 42);
        assert!(!response.tool_calls[0].id.is_empty());
    }

    #[test]
    fn parse_response_rejects_missing_candidates() {
        let err = client()
            .parse_response(serde_json::json!({ "error": "boom" }))
            .unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }
}
