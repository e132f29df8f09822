use serde::{Deserialize, Serialize};

labeled_enum! {
    /// ```text
    /// Pending Approval → Approved → Completed
    ///                  → Rejected
    /// ```
    DisposalStatus {
        PendingApproval => ("Pending Approval", "pending_approval"),
        Approved => ("Approved", "approved"),
        Rejected => ("Rejected", "rejected"),
        Completed => ("Completed", "completed"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalRequest {
    pub id: String,
    pub asset_id: String,
    pub asset_name: String,
    pub reason: String,
    pub status: DisposalStatus,
    pub requested_by: String,
    /// `YYYY-MM-DD`.
    pub request_date: String,
    pub approved_by: Option<String>,
    pub approval_date: Option<String>,
    /// Auction, donation, scrap, ... Set on completion.
    pub disposal_method: Option<String>,
    #[serde(default)]
    pub estimated_value: f64,
    pub notes: Option<String>,
}

/// Input for requesting disposal of an asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDisposalRequest {
    pub reason: String,
    pub requested_by: String,
    #[serde(default)]
    pub estimated_value: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}
