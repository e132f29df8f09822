use serde::{Deserialize, Serialize};

labeled_enum! {
    MaintenanceType {
        Preventive => ("Preventive", "preventive"),
        Corrective => ("Corrective", "corrective"),
        Inspection => ("Inspection", "inspection"),
        Emergency => ("Emergency", "emergency"),
    }
}

labeled_enum! {
    /// Lifecycle of a maintenance job.
    ///
    /// ```text
    /// Scheduled → In Progress → Completed
    ///     ↓            ↓
    ///  Overdue ────────┘
    /// (any non-terminal) → Cancelled
    /// ```
    MaintenanceStatus {
        Scheduled => ("Scheduled", "scheduled"),
        InProgress => ("In Progress", "in_progress"),
        Completed => ("Completed", "completed"),
        Overdue => ("Overdue", "overdue"),
        Cancelled => ("Cancelled", "cancelled"),
    }
}

impl MaintenanceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRecord {
    pub id: String,
    pub asset_id: String,
    pub asset_name: String,
    pub maintenance_type: MaintenanceType,
    pub status: MaintenanceStatus,
    /// `YYYY-MM-DD`.
    pub scheduled_date: String,
    pub completed_date: Option<String>,
    pub assigned_to: String,
    #[serde(default)]
    pub cost: f64,
    pub description: String,
    pub notes: Option<String>,
}

/// Input for scheduling maintenance on an asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMaintenance {
    pub maintenance_type: MaintenanceType,
    pub scheduled_date: String,
    pub assigned_to: String,
    pub description: String,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}
