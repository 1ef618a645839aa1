//! Engine construction, message processing, and the degraded-mode
//! lifecycle.
//!
//! `AssistantEngine` is an explicitly constructed service object holding
//! the backend client, the shared tool registry, and the session store.
//! `EngineHandle` builds it lazily on first use; if construction fails the
//! handle swaps in `FallbackEngine` permanently — the transition is
//! Real → Degraded only, never back.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use scope_common::SessionId;

use crate::classify::FailureKind;
use crate::gemini::GeminiClient;
use crate::session::{ChatOutcome, SessionStore};
use crate::store::{ComplaintStore, SimilaritySearch};
use crate::tools::ToolRegistry;
use crate::{LlmClient, LlmError};

/// System instructions shared by every session.
pub const SYSTEM_PROMPT: &str = "You are SCOPE Assistant, an AI helper for the Student Complaint \
Optimisation and Prioritization Engine. Your job is to help university staff analyze and respond \
to student complaints effectively. You can search for complaints, get complaint details, update \
complaint statuses, and provide statistics. Be professional, helpful and concise in your \
responses. When responding to queries about complaints, focus on providing actionable insights \
and clear information.";

/// Reply of the degraded stub, fixed for the process lifetime.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, the chatbot service is currently unavailable. Please try again later.";

/// Anything that can turn one inbound message into a [`ChatOutcome`].
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn process_message(&self, message: &str, session_id: Option<&str>) -> ChatOutcome;
}

/// The real orchestration engine.
pub struct AssistantEngine {
    client: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    sessions: SessionStore,
}

impl AssistantEngine {
    pub fn new(
        client: Arc<dyn LlmClient>,
        store: Arc<dyn ComplaintStore>,
        search: Arc<dyn SimilaritySearch>,
    ) -> Self {
        Self {
            client,
            tools: Arc::new(ToolRegistry::complaint_tools(store, search)),
            sessions: SessionStore::new(SYSTEM_PROMPT),
        }
    }

    /// Construct with the Gemini backend configured from the environment.
    pub fn from_env(
        store: Arc<dyn ComplaintStore>,
        search: Arc<dyn SimilaritySearch>,
    ) -> Result<Self, LlmError> {
        let client = GeminiClient::from_env()?;
        Ok(Self::new(Arc::new(client), store, search))
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

#[async_trait]
impl MessageProcessor for AssistantEngine {
    async fn process_message(&self, message: &str, session_id: Option<&str>) -> ChatOutcome {
        let (id, session) = self.sessions.get_or_create(session_id);

        // Per-session lock held for the whole turn: same-session turns
        // serialize, other sessions are unaffected.
        let mut session = session.lock().await;
        match session.chat(self.client.as_ref(), &self.tools, message).await {
            Ok(turn) => ChatOutcome {
                response: turn.response,
                session_id: id,
                has_tool_calls: turn.has_tool_calls,
            },
            Err(e) => {
                warn!(session_id = %id, error = %e, "turn failed");
                let kind = FailureKind::classify(&e.to_string());
                let reply = kind.user_message();
                if kind == FailureKind::EmptyInput {
                    // Pin a fixed assistant turn so the next message does
                    // not replay the same bad exchange.
                    session.append_assistant_fallback(reply);
                }
                ChatOutcome {
                    response: reply.to_string(),
                    session_id: id,
                    has_tool_calls: false,
                }
            }
        }
    }
}

/// Degraded stub installed when engine construction fails.
pub struct FallbackEngine;

#[async_trait]
impl MessageProcessor for FallbackEngine {
    async fn process_message(&self, _message: &str, session_id: Option<&str>) -> ChatOutcome {
        ChatOutcome {
            response: FALLBACK_REPLY.to_string(),
            session_id: session_id.map(SessionId::from).unwrap_or_default(),
            has_tool_calls: false,
        }
    }
}

type EngineInit = dyn Fn() -> Result<Arc<dyn MessageProcessor>, LlmError> + Send + Sync;

/// Construct-once handle over the engine.
///
/// The first call builds the engine; a construction failure installs the
/// fallback stub for the process lifetime and is never retried.
/// Initialization is race-free under simultaneous first calls.
pub struct EngineHandle {
    init: Box<EngineInit>,
    cell: OnceCell<Arc<dyn MessageProcessor>>,
}

impl EngineHandle {
    /// Handle over the standard engine: Gemini from the environment, tools
    /// over the given collaborators.
    pub fn new(store: Arc<dyn ComplaintStore>, search: Arc<dyn SimilaritySearch>) -> Self {
        Self::with_initializer(move || {
            AssistantEngine::from_env(store.clone(), search.clone())
                .map(|engine| Arc::new(engine) as Arc<dyn MessageProcessor>)
        })
    }

    /// Handle with an injected constructor. Used by tests and alternative
    /// backend wiring.
    pub fn with_initializer<F>(init: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn MessageProcessor>, LlmError> + Send + Sync + 'static,
    {
        Self {
            init: Box::new(init),
            cell: OnceCell::new(),
        }
    }

    async fn engine(&self) -> &Arc<dyn MessageProcessor> {
        self.cell
            .get_or_init(|| async {
                match (self.init)() {
                    Ok(engine) => {
                        info!("assistant engine initialized");
                        engine
                    }
                    Err(e) => {
                        warn!(error = %e, "engine construction failed, degraded mode is permanent");
                        Arc::new(FallbackEngine)
                    }
                }
            })
            .await
    }

    /// Whether the engine has been constructed yet (real or fallback).
    pub fn initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn process_message(&self, message: &str, session_id: Option<&str>) -> ChatOutcome {
        self.engine().await.process_message(message, session_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TurnRole;
    use crate::store::MemoryStore;
    use crate::test_support::{answer, tool_request, ScriptedClient};
    use scope_common::{Category, Complaint, Urgency};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            Complaint::new(42, "Cannot access the student portal since Monday")
                .with_category(Category::ItSupport)
                .with_urgency(Urgency::High),
        );
        store
    }

    fn engine_with(client: ScriptedClient) -> AssistantEngine {
        let store = seeded_store();
        AssistantEngine::new(Arc::new(client), store.clone(), store)
    }

    #[tokio::test]
    async fn lookup_scenario_mints_session_and_flags_tools() {
        let engine = engine_with(ScriptedClient::new(vec![
            Ok(tool_request(
                "get_complaint",
                serde_json::json!({ "complaint_id": 42 }),
            )),
            Ok(answer("Complaint #42: portal access failure, urgency High.")),
        ]));

        let outcome = engine.process_message("show me complaint #42", None).await;

        assert!(!outcome.session_id.as_str().is_empty());
        assert!(outcome.has_tool_calls);
        assert!(outcome.response.contains("Complaint #42"));
    }

    #[tokio::test]
    async fn lookup_scenario_missing_record_reports_not_found() {
        // The backend relays the tool's not-found text as its answer.
        let engine = engine_with(ScriptedClient::new(vec![
            Ok(tool_request(
                "get_complaint",
                serde_json::json!({ "complaint_id": 404 }),
            )),
            Ok(answer("No complaint found with ID 404")),
        ]));

        let outcome = engine.process_message("show me complaint #404", None).await;
        assert!(outcome.has_tool_calls);
        assert_eq!(outcome.response, "No complaint found with ID 404");
    }

    #[tokio::test]
    async fn backend_failure_is_classified_not_raised() {
        let engine = engine_with(ScriptedClient::new(vec![Err(LlmError::ApiError(
            "database connection refused".into(),
        ))]));

        let outcome = engine.process_message("anything", None).await;

        assert_eq!(outcome.response, FailureKind::Storage.user_message());
        assert!(!outcome.has_tool_calls);
        assert!(!outcome.session_id.as_str().is_empty());

        // No assistant turn was appended for the failed exchange.
        let session = engine.sessions().get(&outcome.session_id).unwrap();
        let session = session.lock().await;
        assert_eq!(session.turn_count(), 1);
        assert_eq!(session.history()[0].role, TurnRole::Human);
    }

    #[tokio::test]
    async fn empty_input_failure_pins_a_fallback_turn() {
        let engine = engine_with(ScriptedClient::new(vec![Err(LlmError::ApiError(
            "400: empty text parameter not allowed".into(),
        ))]));

        let outcome = engine.process_message("   ", None).await;
        assert_eq!(outcome.response, FailureKind::EmptyInput.user_message());

        let session = engine.sessions().get(&outcome.session_id).unwrap();
        let session = session.lock().await;
        assert_eq!(session.turn_count(), 2);
        assert_eq!(session.history()[1].role, TurnRole::Assistant);
        assert_eq!(
            session.history()[1].content,
            FailureKind::EmptyInput.user_message()
        );
    }

    #[tokio::test]
    async fn same_session_turns_serialize_without_corruption() {
        let engine = Arc::new(engine_with(ScriptedClient::new(vec![
            Ok(answer("first answer")),
            Ok(answer("second answer")),
        ])));
        let (id, _) = engine.sessions().get_or_create(None);

        let a = {
            let engine = engine.clone();
            let id = id.clone();
            tokio::spawn(async move { engine.process_message("alpha", Some(id.as_str())).await })
        };
        let b = {
            let engine = engine.clone();
            let id = id.clone();
            tokio::spawn(async move { engine.process_message("beta", Some(id.as_str())).await })
        };
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(a.session_id, id);
        assert_eq!(b.session_id, id);

        // Exactly 2 x 2 turns, strictly alternating: no interleaving.
        let session = engine.sessions().get(&id).unwrap();
        let session = session.lock().await;
        assert_eq!(session.turn_count(), 4);
        let roles: Vec<_> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                TurnRole::Human,
                TurnRole::Assistant,
                TurnRole::Human,
                TurnRole::Assistant
            ]
        );
    }

    /// Backend double that only answers once both in-flight turns reached
    /// it, proving distinct sessions do not serialize against each other.
    struct BarrierClient {
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl LlmClient for BarrierClient {
        async fn generate(
            &self,
            _messages: &[crate::Message],
            _tools: &[crate::ToolDefinition],
        ) -> Result<crate::LlmResponse, LlmError> {
            self.barrier.wait().await;
            Ok(answer("done"))
        }
    }

    #[tokio::test]
    async fn distinct_sessions_proceed_concurrently() {
        let store = seeded_store();
        let engine = Arc::new(AssistantEngine::new(
            Arc::new(BarrierClient {
                barrier: tokio::sync::Barrier::new(2),
            }),
            store.clone(),
            store,
        ));

        let a = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.process_message("one", None).await })
        };
        let b = {
            let engine = engine.clone();
            tokio::spawn(async move { engine.process_message("two", None).await })
        };

        // Both complete only if they were in flight at the same time.
        let joined = tokio::time::timeout(Duration::from_secs(5), async {
            (a.await.unwrap(), b.await.unwrap())
        })
        .await
        .expect("concurrent turns deadlocked");

        assert_ne!(joined.0.session_id, joined.1.session_id);
        assert_eq!(joined.0.response, "done");
        assert_eq!(joined.1.response, "done");
    }

    #[tokio::test]
    async fn failed_construction_degrades_permanently() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let handle = {
            let attempts = attempts.clone();
            EngineHandle::with_initializer(move || {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(LlmError::ConfigError("GOOGLE_API_KEY not set".into()))
            })
        };

        for _ in 0..3 {
            let outcome = handle.process_message("hello", None).await;
            assert_eq!(outcome.response, FALLBACK_REPLY);
            assert!(!outcome.has_tool_calls);
            assert!(!outcome.session_id.as_str().is_empty());
        }
        // Construction was attempted exactly once; degradation is one-way.
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(handle.initialized());
    }

    #[tokio::test]
    async fn fallback_echoes_a_provided_session_id() {
        let handle = EngineHandle::with_initializer(|| {
            Err(LlmError::ConfigError("no credential".into()))
        });
        let outcome = handle.process_message("hi", Some("session-7")).await;
        assert_eq!(outcome.session_id.as_str(), "session-7");
        assert_eq!(outcome.response, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn simultaneous_first_calls_construct_once() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let handle = {
            let attempts = attempts.clone();
            Arc::new(EngineHandle::with_initializer(move || {
                attempts.fetch_add(1, Ordering::SeqCst);
                let store = Arc::new(MemoryStore::new());
                Ok(Arc::new(AssistantEngine::new(
                    Arc::new(ScriptedClient::answering("ok")),
                    store.clone(),
                    store,
                )) as Arc<dyn MessageProcessor>)
            }))
        };

        let mut handles = Vec::new();
        for _ in 0..8 {
            let handle = handle.clone();
            handles.push(tokio::spawn(async move {
                handle.process_message("hi", None).await
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
