use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

labeled_enum! {
    /// Ordered `low < medium < high < critical`.
    AuditSeverity {
        Low => ("low", "low"),
        Medium => ("medium", "medium"),
        High => ("high", "high"),
        Critical => ("critical", "critical"),
    }
}

impl AuditSeverity {
    fn rank(&self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }
}

impl PartialOrd for AuditSeverity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AuditSeverity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

labeled_enum! {
    AuditCategory {
        Create => ("create", "create"),
        Read => ("read", "read"),
        Update => ("update", "update"),
        Delete => ("delete", "delete"),
        Auth => ("auth", "auth"),
        Export => ("export", "export"),
        Import => ("import", "import"),
        System => ("system", "system"),
    }
}

/// One recorded user or system action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: String,
    /// RFC 3339.
    pub timestamp: String,
    pub user_id: String,
    pub user_name: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub severity: AuditSeverity,
    pub category: AuditCategory,
    pub session_id: Option<String>,
    pub description: Option<String>,
}

/// What the caller knows about an action. Identity and time are filled in
/// by the logger; severity and category are derived when left empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAuditEntry {
    pub action: String,
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub old_values: Option<Value>,
    #[serde(default)]
    pub new_values: Option<Value>,
    #[serde(default)]
    pub severity: Option<AuditSeverity>,
    #[serde(default)]
    pub category: Option<AuditCategory>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewAuditEntry {
    pub fn new(action: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            entity_type: entity_type.into(),
            ..Default::default()
        }
    }

    pub fn entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Filters for browsing the audit trail.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    /// Free text over action, user name, entity type/id and description.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub severity: Option<AuditSeverity>,
    #[serde(default)]
    pub category: Option<AuditCategory>,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Inclusive RFC 3339 lower bound.
    #[serde(default)]
    pub from: Option<String>,
    /// Inclusive RFC 3339 upper bound.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            q: None,
            entity_type: None,
            severity: None,
            category: None,
            user_id: None,
            from: None,
            to: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub action: String,
    pub count: usize,
}

/// Aggregates over the whole audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    pub total: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// 24 buckets indexed by UTC hour.
    pub by_hour: Vec<usize>,
    pub top_actions: Vec<ActionCount>,
    pub unique_users: usize,
    pub last24h: usize,
}
