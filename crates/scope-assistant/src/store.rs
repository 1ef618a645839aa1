//! Complaint store and similarity-search collaborator boundaries.
//!
//! The real deployment backs these traits with the service's database and
//! vector index; this crate only depends on the contracts. `MemoryStore`
//! is the in-memory reference implementation used by tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use scope_common::{Category, Complaint, ComplaintStatus, SearchError, StoreError, Urgency};

/// Outcome of a committed status transition.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub previous: ComplaintStatus,
    pub current: ComplaintStatus,
    pub updated_at: DateTime<Utc>,
}

/// One ranked similarity-search result.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: i64,
    pub text: String,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub status: ComplaintStatus,
}

impl SearchHit {
    pub fn from_complaint(complaint: &Complaint) -> Self {
        Self {
            id: complaint.id,
            text: complaint.text.clone(),
            category: complaint.category,
            urgency: complaint.urgency,
            status: complaint.status,
        }
    }
}

/// Record-level operations the assistant's tools consume.
#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Complaint>, StoreError>;

    async fn list_by_category(&self, category: Category) -> Result<Vec<Complaint>, StoreError>;

    /// Unconditional status transition (any status to any status).
    /// Returns `None` for unknown ids. Implementations commit exactly once
    /// on success and roll back any partial change before returning an
    /// error.
    async fn update_status(
        &self,
        id: i64,
        status: ComplaintStatus,
    ) -> Result<Option<StatusChange>, StoreError>;
}

/// Top-k similarity search over complaint texts.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// In-memory store with keyword-overlap search.
#[derive(Default)]
pub struct MemoryStore {
    complaints: Mutex<HashMap<i64, Complaint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, complaint: Complaint) {
        self.complaints
            .lock()
            .expect("complaint map poisoned")
            .insert(complaint.id, complaint);
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn fetch_by_id(&self, id: i64) -> Result<Option<Complaint>, StoreError> {
        let map = self.complaints.lock().expect("complaint map poisoned");
        Ok(map.get(&id).cloned())
    }

    async fn list_by_category(&self, category: Category) -> Result<Vec<Complaint>, StoreError> {
        let map = self.complaints.lock().expect("complaint map poisoned");
        let mut matching: Vec<Complaint> = map
            .values()
            .filter(|c| c.category == Some(category))
            .cloned()
            .collect();
        matching.sort_by_key(|c| c.id);
        Ok(matching)
    }

    async fn update_status(
        &self,
        id: i64,
        status: ComplaintStatus,
    ) -> Result<Option<StatusChange>, StoreError> {
        let mut map = self.complaints.lock().expect("complaint map poisoned");
        let Some(complaint) = map.get_mut(&id) else {
            return Ok(None);
        };
        // Single mutation under the lock: nothing partial can be observed.
        let previous = complaint.status;
        complaint.status = status;
        complaint.updated_at = Utc::now();
        Ok(Some(StatusChange {
            previous,
            current: status,
            updated_at: complaint.updated_at,
        }))
    }
}

#[async_trait]
impl SimilaritySearch for MemoryStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, SearchError> {
        let query_tokens = Self::tokens(query);
        let map = self.complaints.lock().expect("complaint map poisoned");

        let mut scored: Vec<(usize, SearchHit)> = map
            .values()
            .filter_map(|complaint| {
                let text_tokens = Self::tokens(&complaint.text);
                let score = query_tokens
                    .iter()
                    .filter(|t| text_tokens.contains(t))
                    .count();
                (score > 0).then(|| (score, SearchHit::from_complaint(complaint)))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.id.cmp(&b.1.id)));
        Ok(scored.into_iter().take(k).map(|(_, hit)| hit).collect())
    }
}
