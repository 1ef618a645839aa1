//! Per-category aggregate statistics.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use scope_common::{Category, ComplaintStatus, Urgency};

use crate::store::ComplaintStore;

use super::{ParamKind, Tool, ToolParam};

pub struct ComplaintStatsTool {
    store: Arc<dyn ComplaintStore>,
}

impl ComplaintStatsTool {
    pub fn new(store: Arc<dyn ComplaintStore>) -> Self {
        Self { store }
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

#[async_trait]
impl Tool for ComplaintStatsTool {
    fn name(&self) -> &'static str {
        "get_complaint_stats_by_type"
    }

    fn description(&self) -> &'static str {
        "Get statistics about complaints by category"
    }

    fn params(&self) -> &[ToolParam] {
        static PARAMS: [ToolParam; 1] = [ToolParam::required(
            "category",
            ParamKind::Text,
            "The category to filter by (Academic, Facilities, Housing, IT Support, Financial Aid, Campus Life, Other)",
        )];
        &PARAMS
    }

    async fn invoke(&self, args: &serde_json::Value) -> String {
        let requested = args["category"].as_str().unwrap_or_default();

        let Some(category) = Category::from_name(requested) else {
            return format!(
                "⚠️ **Invalid category**. Please use one of: {}",
                Category::valid_names()
            );
        };

        let complaints = match self.store.list_by_category(category).await {
            Ok(complaints) => complaints,
            Err(e) => return format!("Error getting complaint statistics: {e}"),
        };

        if complaints.is_empty() {
            return format!("📊 No complaints found in category **{category}**");
        }

        let total = complaints.len();
        let mut status_counts: BTreeMap<ComplaintStatus, usize> = BTreeMap::new();
        let mut urgency_counts: BTreeMap<Option<Urgency>, usize> = BTreeMap::new();
        let mut assigned = 0usize;
        let mut has_response = 0usize;

        for complaint in &complaints {
            *status_counts.entry(complaint.status).or_default() += 1;
            *urgency_counts.entry(complaint.urgency).or_default() += 1;
            if complaint.assigned_to.is_some() {
                assigned += 1;
            }
            if complaint.response.is_some() {
                has_response += 1;
            }
        }

        let mut output = format!("### 📊 Statistics for {category} Complaints\n\n");

        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        output.push_str(&format!("| Total complaints | **{total}** |\n"));
        output.push_str(&format!(
            "| Assigned | {} ({}%) |\n",
            assigned,
            percentage(assigned, total)
        ));
        output.push_str(&format!(
            "| With responses | {} ({}%) |\n\n",
            has_response,
            percentage(has_response, total)
        ));

        output.push_str("#### Status Distribution\n\n");
        output.push_str("| Status | Count | Percentage |\n");
        output.push_str("|--------|-------|------------|\n");
        for (status, count) in &status_counts {
            output.push_str(&format!(
                "| {} | {} | {}% |\n",
                status,
                count,
                percentage(*count, total)
            ));
        }

        output.push_str("\n#### Urgency Distribution\n\n");
        output.push_str("| Urgency | Count | Percentage |\n");
        output.push_str("|---------|-------|------------|\n");
        for (urgency, count) in &urgency_counts {
            let display = urgency
                .map(|u| format!("{} {}", u.indicator(), u))
                .unwrap_or_else(|| "Not set".to_string());
            output.push_str(&format!(
                "| {} | {} | {}% |\n",
                display,
                count,
                percentage(*count, total)
            ));
        }

        output.push_str("\nWould you like to search for specific complaints in this category?");
        output
    }
}
