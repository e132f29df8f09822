use serde::{Deserialize, Serialize};

use super::AssigneeType;

/// Historical record of an asset changing hands. Never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub asset_id: String,
    pub asset_name: String,
    pub from_holder: Option<String>,
    pub to_holder: String,
    pub from_department: String,
    pub to_department: String,
    pub reason: Option<String>,
    pub approved_by: String,
    /// RFC 3339.
    pub transfer_date: String,
}

/// Input for moving an asset to a new holder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub to_holder: String,
    #[serde(default = "default_holder_type")]
    pub holder_type: AssigneeType,
    pub to_department: String,
    pub approved_by: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

fn default_holder_type() -> AssigneeType {
    AssigneeType::Employee
}
