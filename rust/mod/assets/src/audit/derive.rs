//! Severity and category from the action string, by keyword.

use crate::model::{AuditCategory, AuditSeverity};

const CRITICAL: &[&str] = &["unauthorized", "breach", "error", "fail"];
const HIGH: &[&str] = &["delete", "remove", "dispose", "reject"];
const MEDIUM: &[&str] = &[
    "create", "add", "update", "edit", "assign", "transfer", "approve", "import",
];

/// First match wins, so a category listed earlier takes precedence.
const CATEGORIES: &[(&[&str], AuditCategory)] = &[
    (&["login", "logout", "auth", "password"], AuditCategory::Auth),
    (&["export"], AuditCategory::Export),
    (&["import"], AuditCategory::Import),
    (&["delete", "remove", "dispose"], AuditCategory::Delete),
    (&["create", "add", "register"], AuditCategory::Create),
    (
        &["update", "edit", "assign", "transfer", "approve", "reject", "complete", "schedule"],
        AuditCategory::Update,
    ),
    (&["view", "read", "list", "search"], AuditCategory::Read),
];

fn contains_any(action: &str, words: &[&str]) -> bool {
    words.iter().any(|w| action.contains(w))
}

pub fn derive_severity(action: &str) -> AuditSeverity {
    let action = action.to_lowercase();
    if contains_any(&action, CRITICAL) {
        AuditSeverity::Critical
    } else if contains_any(&action, HIGH) {
        AuditSeverity::High
    } else if contains_any(&action, MEDIUM) {
        AuditSeverity::Medium
    } else {
        AuditSeverity::Low
    }
}

pub fn derive_category(action: &str) -> AuditCategory {
    let action = action.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(words, _)| contains_any(&action, words))
        .map(|(_, category)| *category)
        .unwrap_or(AuditCategory::System)
}
