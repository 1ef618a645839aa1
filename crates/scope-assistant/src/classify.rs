//! Maps raised failures onto fixed user-facing messages.

/// User-facing category for a failure, chosen by keyword. Matching is
/// case-insensitive and ordered; the first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The backend rejected an empty text parameter; the turn is retryable.
    EmptyInput,
    Storage,
    Inference,
    Performance,
    Authorization,
    Generic,
}

impl FailureKind {
    pub fn classify(message: &str) -> Self {
        let msg = message.to_lowercase();
        if msg.contains("empty text parameter") {
            FailureKind::EmptyInput
        } else if msg.contains("database") || msg.contains("sql") {
            FailureKind::Storage
        } else if msg.contains("model") || msg.contains("prediction") {
            FailureKind::Inference
        } else if msg.contains("memory") || msg.contains("timeout") {
            FailureKind::Performance
        } else if msg.contains("permission") || msg.contains("access") {
            FailureKind::Authorization
        } else {
            FailureKind::Generic
        }
    }

    /// The fixed sentence shown to the user for this kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::EmptyInput => {
                "I didn't receive any message content to work with. Could you rephrase your request?"
            }
            FailureKind::Storage => {
                "I'm having trouble accessing the complaint database right now. Please try again in a moment."
            }
            FailureKind::Inference => {
                "The analysis model is temporarily unavailable. I can still help with direct complaint lookups."
            }
            FailureKind::Performance => {
                "That request took too long to process. Please try again with a simpler query."
            }
            FailureKind::Authorization => {
                "I don't have permission to perform that action. Please contact an administrator."
            }
            FailureKind::Generic => {
                "I encountered an error while processing your request. Please try again or contact support."
            }
        }
    }
}

/// Classify a failure message straight to its user-facing sentence.
pub fn error_reply(message: &str) -> &'static str {
    FailureKind::classify(message).user_message()
}
