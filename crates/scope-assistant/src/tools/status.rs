//! Status transitions, validated before any store mutation.

use async_trait::async_trait;
use std::sync::Arc;

use scope_common::ComplaintStatus;

use crate::store::ComplaintStore;

use super::{ParamKind, Tool, ToolParam};

const DATE_FORMAT: &str = "%b %d, %Y at %H:%M";

pub struct UpdateStatusTool {
    store: Arc<dyn ComplaintStore>,
}

impl UpdateStatusTool {
    pub fn new(store: Arc<dyn ComplaintStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for UpdateStatusTool {
    fn name(&self) -> &'static str {
        "update_complaint_status"
    }

    fn description(&self) -> &'static str {
        "Update the status of a specific complaint"
    }

    fn params(&self) -> &[ToolParam] {
        static PARAMS: [ToolParam; 2] = [
            ToolParam::required(
                "complaint_id",
                ParamKind::Integer,
                "The ID of the complaint to update",
            ),
            ToolParam::required(
                "status",
                ParamKind::Text,
                "The new status for the complaint (Pending, In Progress, Resolved, Closed)",
            ),
        ];
        &PARAMS
    }

    async fn invoke(&self, args: &serde_json::Value) -> String {
        let id = args["complaint_id"].as_i64().unwrap_or_default();
        let requested = args["status"].as_str().unwrap_or_default();

        // Validate the status before touching the store.
        let Some(status) = ComplaintStatus::from_name(requested) else {
            return format!(
                "⚠️ **Invalid status**. Please use one of: {}",
                ComplaintStatus::valid_names()
            );
        };

        let change = match self.store.update_status(id, status).await {
            Ok(Some(change)) => change,
            Ok(None) => return format!("❌ **Error**: No complaint found with ID {id}"),
            Err(e) => return format!("Error updating complaint status: {e}"),
        };

        let mut output = format!("### {} Status Updated\n\n", status.indicator());
        output.push_str(&format!(
            "**Complaint #{id}** status has been changed:\n\n"
        ));
        output.push_str("| | |\n");
        output.push_str("|---|---|\n");
        output.push_str(&format!("| Previous status | {} |\n", change.previous));
        output.push_str(&format!("| New status | **{}** |\n", change.current));
        output.push_str(&format!(
            "| Updated at | {} |\n\n",
            change.updated_at.format(DATE_FORMAT)
        ));
        output.push_str("Would you like to view the full details of this complaint now?");
        output
    }
}
