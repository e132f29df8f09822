use serde::{Deserialize, Serialize};

labeled_enum! {
    AssignmentStatus {
        Active => ("Active", "active"),
        Returned => ("Returned", "returned"),
        Overdue => ("Overdue", "overdue"),
    }
}

labeled_enum! {
    /// What kind of holder an asset is assigned to.
    AssigneeType {
        Employee => ("Employee", "employee"),
        Department => ("Department", "department"),
        Location => ("Location", "location"),
    }
}

/// Links an asset to its current holder. Superseded, not versioned, on transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub asset_id: String,
    pub asset_name: String,
    pub assigned_to: String,
    pub assignee_type: AssigneeType,
    pub department: String,
    /// `YYYY-MM-DD`.
    pub assigned_date: String,
    pub due_date: Option<String>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
}

/// Input for assigning an asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub assigned_to: String,
    #[serde(default = "default_assignee_type")]
    pub assignee_type: AssigneeType,
    /// Defaults to the asset's department.
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_assignee_type() -> AssigneeType {
    AssigneeType::Employee
}
