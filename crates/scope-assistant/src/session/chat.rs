//! The per-turn conversation loop.
//!
//! One turn walks a small state machine: ask the backend, and either take
//! its text as the final answer or dispatch the tool calls it requested,
//! feed the results back, and ask again. A hard round cap guarantees
//! termination even if the backend keeps requesting tools.

use tracing::{debug, warn};

use crate::classify::FailureKind;
use crate::sanitize::clean_response;
use crate::tools::ToolRegistry;
use crate::{LlmClient, LlmError, Message, Role};

use super::manager::Session;
use super::types::{Turn, TurnResult};

impl Session {
    /// Process one inbound staff message against this session's history.
    ///
    /// On success the human turn and the sanitized assistant turn are both
    /// appended. On backend failure the error propagates with the human
    /// turn retained and no assistant turn appended; the engine layer
    /// classifies it.
    pub async fn chat(
        &mut self,
        client: &dyn LlmClient,
        tools: &ToolRegistry,
        user_message: impl Into<String>,
    ) -> Result<TurnResult, LlmError> {
        self.history.push(Turn::human(user_message));

        let definitions = tools.definitions();
        let mut messages = self.build_messages();
        let mut rounds = 0u32;
        let mut used_tools = false;

        loop {
            let response = client.generate(&messages, &definitions).await?;

            if response.tool_calls.is_empty() {
                let answer = clean_response(&response.content);
                self.history.push(Turn::assistant(answer.clone()));
                return Ok(TurnResult {
                    response: answer,
                    has_tool_calls: used_tools,
                });
            }

            used_tools = true;
            rounds += 1;
            if rounds > self.max_tool_rounds {
                warn!(
                    max = self.max_tool_rounds,
                    "tool-round cap reached, degrading this turn"
                );
                let answer = FailureKind::Generic.user_message().to_string();
                self.history.push(Turn::assistant(answer.clone()));
                return Ok(TurnResult {
                    response: answer,
                    has_tool_calls: true,
                });
            }

            // Gemini rejects empty text parts, so only non-empty assistant
            // commentary joins the scratchpad.
            if !response.content.trim().is_empty() {
                messages.push(Message {
                    role: Role::Assistant,
                    content: response.content.clone(),
                });
            }

            for call in &response.tool_calls {
                debug!(tool = %call.name, round = rounds, "tool requested");
                let result = tools.dispatch(call).await;
                messages.push(Message {
                    role: Role::Tool,
                    content: format!("[Tool Result: {}]\n{}", call.name, result),
                });
            }
        }
    }
}
