//! Full record rendering for a single complaint.

use async_trait::async_trait;
use std::sync::Arc;

use crate::store::ComplaintStore;

use super::{ParamKind, Tool, ToolParam};

const DATE_FORMAT: &str = "%b %d, %Y at %H:%M";

pub struct GetComplaintTool {
    store: Arc<dyn ComplaintStore>,
}

impl GetComplaintTool {
    pub fn new(store: Arc<dyn ComplaintStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for GetComplaintTool {
    fn name(&self) -> &'static str {
        "get_complaint"
    }

    fn description(&self) -> &'static str {
        "Get details about a specific complaint by ID"
    }

    fn params(&self) -> &[ToolParam] {
        static PARAMS: [ToolParam; 1] = [ToolParam::required(
            "complaint_id",
            ParamKind::Integer,
            "The ID of the complaint to retrieve",
        )];
        &PARAMS
    }

    async fn invoke(&self, args: &serde_json::Value) -> String {
        let id = args["complaint_id"].as_i64().unwrap_or_default();

        let complaint = match self.store.fetch_by_id(id).await {
            Ok(Some(complaint)) => complaint,
            Ok(None) => return format!("No complaint found with ID {id}"),
            Err(e) => return format!("Error retrieving complaint: {e}"),
        };

        let urgency = complaint
            .urgency
            .map(|u| format!("{} {}", u.indicator(), u))
            .unwrap_or_else(|| "Not set".to_string());
        let category = complaint
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "Not set".to_string());

        let mut output = format!("### Complaint #{}\n\n", complaint.id);
        output.push_str(&format!("**Complaint Text:**\n> {}\n\n", complaint.text));

        output.push_str("| Property | Value |\n");
        output.push_str("|----------|-------|\n");
        output.push_str(&format!("| Category | {category} |\n"));
        output.push_str(&format!("| Urgency | {urgency} |\n"));
        output.push_str(&format!("| Status | {} |\n", complaint.status));
        output.push_str(&format!(
            "| Created | {} |\n",
            complaint.created_at.format(DATE_FORMAT)
        ));
        if let Some(ref staff) = complaint.assigned_to {
            output.push_str(&format!("| Assigned to | {staff} |\n"));
        }
        output.push('\n');

        match complaint.response {
            Some(ref response) => output.push_str(&format!("**Response:**\n> {response}\n\n")),
            None => output.push_str("**No response has been provided yet.**\n\n"),
        }

        output.push_str("You can update this complaint's status with 'update complaint status' command.");
        output
    }
}
