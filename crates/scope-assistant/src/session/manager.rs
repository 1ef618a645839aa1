//! Session state and the session store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tracing::debug;

use scope_common::SessionId;

use crate::{Message, Role};

use super::types::Turn;

pub(super) const DEFAULT_MAX_TOOL_ROUNDS: u32 = 10;

/// One staff conversation: append-only turn history plus loop
/// configuration. Owned by the [`SessionStore`]; turn processing happens
/// under the store's per-session lock.
pub struct Session {
    /// Completed turns, chronological. Never reordered or truncated.
    pub(super) history: Vec<Turn>,
    /// System instructions prepended to every backend call.
    pub(super) system_prompt: Arc<str>,
    /// Hard cap on tool rounds within one turn.
    pub(super) max_tool_rounds: u32,
}

impl Session {
    pub fn new(system_prompt: Arc<str>) -> Self {
        Self {
            history: Vec::new(),
            system_prompt,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, max: u32) -> Self {
        self.max_tool_rounds = max;
        self
    }

    /// The full conversation history.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn turn_count(&self) -> usize {
        self.history.len()
    }

    /// Record a fixed assistant turn outside the normal loop. Used after an
    /// empty-input backend failure so the bad state does not recur on the
    /// next message.
    pub(crate) fn append_assistant_fallback(&mut self, content: impl Into<String>) {
        self.history.push(Turn::assistant(content));
    }

    /// History rendered as backend messages, system instructions first.
    pub(super) fn build_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(Message {
            role: Role::System,
            content: self.system_prompt.to_string(),
        });
        for turn in &self.history {
            messages.push(Message {
                role: match turn.role {
                    super::types::TurnRole::Human => Role::User,
                    super::types::TurnRole::Assistant => Role::Assistant,
                },
                content: turn.content.clone(),
            });
        }
        messages
    }
}

/// Maps session identifiers to sessions.
///
/// The map mutex covers only lookup/insert; each session sits behind its
/// own async mutex, so turns on the same session serialize while turns on
/// different sessions proceed independently.
pub struct SessionStore {
    sessions: StdMutex<HashMap<SessionId, Arc<Mutex<Session>>>>,
    system_prompt: Arc<str>,
}

impl SessionStore {
    pub fn new(system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            sessions: StdMutex::new(HashMap::new()),
            system_prompt: system_prompt.into(),
        }
    }

    /// Resolve an existing session or mint a fresh one.
    ///
    /// An absent *or unknown* identifier mints a new session, so callers
    /// cannot seed arbitrary tokens into the map.
    pub fn get_or_create(&self, requested: Option<&str>) -> (SessionId, Arc<Mutex<Session>>) {
        let mut map = self.sessions.lock().expect("session map poisoned");

        if let Some(requested) = requested {
            let key = SessionId::from(requested);
            if let Some(existing) = map.get(&key) {
                return (key, existing.clone());
            }
        }

        let id = SessionId::new();
        let session = Arc::new(Mutex::new(Session::new(self.system_prompt.clone())));
        map.insert(id.clone(), session.clone());
        debug!(session_id = %id, total = map.len(), "created session");
        (id, session)
    }

    /// Look up an existing session without creating one.
    pub fn get(&self, id: &SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
