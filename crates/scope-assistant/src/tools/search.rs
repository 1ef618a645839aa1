//! Keyword search over complaints via the similarity-search collaborator.

use async_trait::async_trait;
use std::sync::Arc;

use crate::store::SimilaritySearch;

use super::{ParamKind, Tool, ToolParam};

const TOP_K: usize = 5;
const PREVIEW_CHARS: usize = 60;

pub struct SearchComplaintsTool {
    search: Arc<dyn SimilaritySearch>,
}

impl SearchComplaintsTool {
    pub fn new(search: Arc<dyn SimilaritySearch>) -> Self {
        Self { search }
    }
}

fn preview(text: &str) -> String {
    let truncated: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", truncated.replace('\n', " ").trim())
}

#[async_trait]
impl Tool for SearchComplaintsTool {
    fn name(&self) -> &'static str {
        "search_complaints"
    }

    fn description(&self) -> &'static str {
        "Search for complaints using keywords"
    }

    fn params(&self) -> &[ToolParam] {
        static PARAMS: [ToolParam; 1] = [ToolParam::required(
            "query",
            ParamKind::Text,
            "The search query to find complaints",
        )];
        &PARAMS
    }

    async fn invoke(&self, args: &serde_json::Value) -> String {
        let query = args["query"].as_str().unwrap_or_default();

        let hits = match self.search.search(query, TOP_K).await {
            Ok(hits) => hits,
            Err(e) => return format!("Error searching complaints: {e}"),
        };

        if hits.is_empty() {
            return "No complaints found matching your query.".to_string();
        }

        let mut output = format!("### Search Results for: '{query}'\n\n");
        output.push_str("| ID | Preview | Category | Urgency | Status |\n");
        output.push_str("|---|---------|----------|---------|--------|\n");

        for hit in &hits {
            let category = hit
                .category
                .map(|c| c.to_string())
                .unwrap_or_else(|| "Not set".to_string());
            let urgency = hit
                .urgency
                .map(|u| format!("{} {}", u.indicator(), u))
                .unwrap_or_else(|| "Not set".to_string());
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                hit.id,
                preview(&hit.text),
                category,
                urgency,
                hit.status
            ));
        }

        output.push_str("\n\nTo view full details of a specific complaint, ask me to 'get complaint #ID'");
        output
    }
}
