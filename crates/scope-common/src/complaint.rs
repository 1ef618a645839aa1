use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Complaint category assigned by the classifier (or staff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Academic,
    Facilities,
    Housing,
    #[serde(rename = "IT Support")]
    ItSupport,
    #[serde(rename = "Financial Aid")]
    FinancialAid,
    #[serde(rename = "Campus Life")]
    CampusLife,
    Other,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Academic,
        Category::Facilities,
        Category::Housing,
        Category::ItSupport,
        Category::FinancialAid,
        Category::CampusLife,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Academic => "Academic",
            Category::Facilities => "Facilities",
            Category::Housing => "Housing",
            Category::ItSupport => "IT Support",
            Category::FinancialAid => "Financial Aid",
            Category::CampusLife => "Campus Life",
            Category::Other => "Other",
        }
    }

    /// Parse an exact category name. Names are matched verbatim; anything
    /// else is rejected so capability validation stays strict.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    /// The valid names, comma-separated, for validation messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Urgency level assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [
        Urgency::Low,
        Urgency::Medium,
        Urgency::High,
        Urgency::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
            Urgency::Critical => "Critical",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|u| u.as_str() == name)
    }

    /// Colored marker shown next to the urgency in rendered tables.
    pub fn indicator(&self) -> &'static str {
        match self {
            Urgency::Critical => "🔴",
            Urgency::High => "🟠",
            Urgency::Medium => "🟡",
            Urgency::Low => "🟢",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Workflow status of a complaint. Transitions are unconditional: staff may
/// move a complaint between any two statuses, including reopening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Closed => "Closed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }

    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Marker shown in status-update confirmations.
    pub fn indicator(&self) -> &'static str {
        match self {
            ComplaintStatus::Resolved => "✅",
            ComplaintStatus::Closed => "🔒",
            ComplaintStatus::InProgress => "⏳",
            ComplaintStatus::Pending => "🔄",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A student complaint record as stored by the complaint store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Complaint {
    pub id: i64,
    pub text: String,
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_to: Option<String>,
    pub response: Option<String>,
}

impl Complaint {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: text.into(),
            category: None,
            urgency: None,
            status: ComplaintStatus::Pending,
            created_at: now,
            updated_at: now,
            assigned_to: None,
            response: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    pub fn with_status(mut self, status: ComplaintStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assigned_to(mut self, staff: impl Into<String>) -> Self {
        self.assigned_to = Some(staff.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }
}
