//! Tools the assistant may invoke mid-turn against the complaint store.
//!
//! The registry is the fixed, ordered set of tools shared by every
//! session: search, record detail, status update, and per-category
//! statistics. Dispatch validates arguments against each tool's declared
//! schema before the tool runs; unknown names and malformed argument bags
//! come back as explanatory tool results rather than failures, so a bad
//! call never aborts the conversation loop.

mod detail;
mod schema;
mod search;
mod stats;
mod status;

pub use detail::GetComplaintTool;
pub use schema::{json_schema, validate_args, ParamKind, ToolParam};
pub use search::SearchComplaintsTool;
pub use stats::ComplaintStatsTool;
pub use status::UpdateStatusTool;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::store::{ComplaintStore, SimilaritySearch};
use crate::{ToolCall, ToolDefinition};

/// A named, schema-typed operation the conversation loop may invoke.
///
/// Implementations render their outcome — including collaborator failures —
/// as markdown text; `invoke` is infallible by contract.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn params(&self) -> &[ToolParam];

    /// Run with an argument bag that already passed schema validation.
    async fn invoke(&self, args: &serde_json::Value) -> String;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: json_schema(self.params()),
        }
    }
}

/// The fixed set of tools, in advertisement order. Read-only after
/// construction and shared by all sessions.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// The standard complaint-assistant tool set.
    pub fn complaint_tools(
        store: Arc<dyn ComplaintStore>,
        search: Arc<dyn SimilaritySearch>,
    ) -> Self {
        Self::new(vec![
            Arc::new(SearchComplaintsTool::new(search)),
            Arc::new(GetComplaintTool::new(store.clone())),
            Arc::new(UpdateStatusTool::new(store.clone())),
            Arc::new(ComplaintStatsTool::new(store)),
        ])
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    fn names(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Dispatch one requested call: resolve by name, validate the argument
    /// bag, invoke. Every outcome is a tool-result string.
    pub async fn dispatch(&self, call: &ToolCall) -> String {
        let Some(tool) = self.get(&call.name) else {
            return format!(
                "Unknown tool '{}'. Available tools: {}",
                call.name,
                self.names()
            );
        };

        match validate_args(tool.params(), &call.arguments) {
            Ok(coerced) => {
                debug!(tool = %call.name, "dispatching tool");
                tool.invoke(&coerced).await
            }
            Err(message) => {
                debug!(tool = %call.name, %message, "rejected tool arguments");
                format!("⚠️ **Invalid arguments for {}**: {}", call.name, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use scope_common::{Category, Complaint, Urgency};

    fn registry() -> ToolRegistry {
        let store = Arc::new(MemoryStore::new());
        store.insert(
            Complaint::new(42, "Cannot access the student portal since Monday")
                .with_category(Category::ItSupport)
                .with_urgency(Urgency::High),
        );
        ToolRegistry::complaint_tools(store.clone(), store)
    }

    #[test]
    fn advertises_four_tools_in_order() {
        let defs = registry().definitions();
        let names: Vec<_> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "search_complaints",
                "get_complaint",
                "update_complaint_status",
                "get_complaint_stats_by_type"
            ]
        );
        for def in &defs {
            assert_eq!(def.parameters["type"], "object");
            assert!(!def.description.is_empty());
        }
    }

    #[tokio::test]
    async fn dispatch_unknown_tool_is_explanatory() {
        let call = ToolCall {
            id: "t1".into(),
            name: "delete_everything".into(),
            arguments: serde_json::json!({}),
        };
        let result = registry().dispatch(&call).await;
        assert!(result.starts_with("Unknown tool 'delete_everything'"));
        assert!(result.contains("search_complaints"));
    }

    #[tokio::test]
    async fn dispatch_validates_before_invoking() {
        let call = ToolCall {
            id: "t1".into(),
            name: "get_complaint".into(),
            arguments: serde_json::json!({ "complaint_id": "not-a-number" }),
        };
        let result = registry().dispatch(&call).await;
        assert!(result.contains("Invalid arguments for get_complaint"));
    }

    #[tokio::test]
    async fn dispatch_coerces_and_invokes() {
        let call = ToolCall {
            id: "t1".into(),
            name: "get_complaint".into(),
            arguments: serde_json::json!({ "complaint_id": "42" }),
        };
        let result = registry().dispatch(&call).await;
        assert!(result.contains("Complaint #42"));
    }
}
