//! Session data types.

use serde::{Deserialize, Serialize};

use scope_common::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Human,
    Assistant,
}

/// One message within a session. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Human,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// What one completed turn produced, before the session id is attached.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub response: String,
    pub has_tool_calls: bool,
}

/// The per-message exchange result returned to the caller. Exactly one is
/// produced per inbound message, failures included; `session_id` is always
/// populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOutcome {
    pub response: String,
    pub session_id: SessionId,
    pub has_tool_calls: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_constructors() {
        let t = Turn::human("hello");
        assert_eq!(t.role, TurnRole::Human);
        let t = Turn::assistant("hi");
        assert_eq!(t.role, TurnRole::Assistant);
    }

    #[test]
    fn outcome_serializes_with_wire_field_names() {
        let outcome = ChatOutcome {
            response: "done".into(),
            session_id: SessionId::from("abc"),
            has_tool_calls: true,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["response"], "done");
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["has_tool_calls"], true);
    }
}
