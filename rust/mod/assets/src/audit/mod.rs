//! Append-only audit trail.
//!
//! Entries go to the backend's `audit_logs` table when one is configured
//! and reachable; otherwise they are prepended to a bounded list in the
//! local audit document, evicting the oldest past `capacity`. Logging
//! never fails the action being logged: write errors are traced and
//! swallowed.

mod derive;
mod stats;

use std::sync::Arc;

use assettrack_core::{ListResult, ServiceError, new_id, now_rfc3339, paginate};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{AuditLog, AuditQuery, AuditSeverity, AuditStats, NewAuditEntry};
use crate::service::{Origin, StorageFacade};
use crate::store::Entity;

pub use derive::{derive_category, derive_severity};
pub use stats::compute as compute_stats;

pub const DEFAULT_CAPACITY: usize = 1000;

/// Who is acting. Passed with every entry instead of held as logger state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    pub user_id: String,
    pub user_name: String,
    pub session_id: Option<String>,
}

impl AuditContext {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            session_id: None,
        }
    }

    /// Actions taken by the server itself.
    pub fn system() -> Self {
        Self::new("system", "System")
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

pub struct AuditLogger {
    store: Arc<StorageFacade>,
    capacity: usize,
}

impl AuditLogger {
    pub fn new(store: Arc<StorageFacade>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an action. Returns the stored entry, or `None` if it could
    /// not be written anywhere.
    pub async fn log(&self, ctx: &AuditContext, entry: NewAuditEntry) -> Option<AuditLog> {
        let record = build(ctx, entry);
        match self.write(&record).await {
            Ok(origin) => {
                debug!(action = %record.action, origin = ?origin, "audit entry written");
                Some(record)
            }
            Err(e) => {
                warn!(action = %record.action, error = %e, "failed to write audit entry");
                None
            }
        }
    }

    pub async fn log_create<T: Serialize>(
        &self,
        ctx: &AuditContext,
        entity_type: &str,
        id: &str,
        after: &T,
    ) -> Option<AuditLog> {
        let mut entry = NewAuditEntry::new(format!("create_{}", entity_type), entity_type)
            .entity_id(id)
            .description(format!("Created {} {}", entity_type, id));
        entry.new_values = snapshot(after);
        self.log(ctx, entry).await
    }

    pub async fn log_update<T: Serialize>(
        &self,
        ctx: &AuditContext,
        entity_type: &str,
        id: &str,
        before: &T,
        after: &T,
    ) -> Option<AuditLog> {
        let mut entry = NewAuditEntry::new(format!("update_{}", entity_type), entity_type)
            .entity_id(id)
            .description(format!("Updated {} {}", entity_type, id));
        entry.old_values = snapshot(before);
        entry.new_values = snapshot(after);
        self.log(ctx, entry).await
    }

    pub async fn log_delete<T: Serialize>(
        &self,
        ctx: &AuditContext,
        entity_type: &str,
        id: &str,
        before: &T,
    ) -> Option<AuditLog> {
        let mut entry = NewAuditEntry::new(format!("delete_{}", entity_type), entity_type)
            .entity_id(id)
            .description(format!("Deleted {} {}", entity_type, id));
        entry.old_values = snapshot(before);
        self.log(ctx, entry).await
    }

    /// The full trail, newest first.
    pub async fn entries(&self) -> Result<Vec<AuditLog>, ServiceError> {
        let mut logs: Vec<AuditLog> = self.store.list().await?;
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(logs)
    }

    pub async fn get_audit_logs(&self, query: &AuditQuery) -> Result<ListResult<AuditLog>, ServiceError> {
        let logs: Vec<AuditLog> = self
            .entries()
            .await?
            .into_iter()
            .filter(|log| query.matches(log))
            .collect();
        Ok(paginate(logs, query.limit, query.offset))
    }

    pub async fn get_audit_stats(&self) -> Result<AuditStats, ServiceError> {
        Ok(compute_stats(&self.entries().await?, Utc::now()))
    }

    async fn write(&self, record: &AuditLog) -> Result<Origin, ServiceError> {
        if let Some(remote) = self.store.remote() {
            match remote.insert(AuditLog::TABLE, &record.to_row()?).await {
                Ok(_) => return Ok(Origin::Remote),
                Err(e) => warn!(
                    table = AuditLog::TABLE,
                    error = %e,
                    "remote backend failed, falling back to local store"
                ),
            }
        }
        let value = serde_json::to_value(record)?;
        self.store.local().transact(|tx| {
            let logs = tx.collection_mut(AuditLog::DOCUMENT, AuditLog::COLLECTION)?;
            logs.insert(0, value);
            logs.truncate(self.capacity);
            Ok(())
        })?;
        Ok(Origin::LocalFallback)
    }
}

fn build(ctx: &AuditContext, entry: NewAuditEntry) -> AuditLog {
    let derived = derive_severity(&entry.action);
    // High and Critical derivations are a floor for explicit values.
    let severity = match entry.severity {
        Some(explicit) if derived >= AuditSeverity::High => explicit.max(derived),
        Some(explicit) => explicit,
        None => derived,
    };
    let category = entry.category.unwrap_or_else(|| derive_category(&entry.action));
    AuditLog {
        id: new_id(),
        timestamp: now_rfc3339(),
        user_id: ctx.user_id.clone(),
        user_name: ctx.user_name.clone(),
        action: entry.action,
        entity_type: entry.entity_type,
        entity_id: entry.entity_id,
        old_values: entry.old_values,
        new_values: entry.new_values,
        severity,
        category,
        session_id: ctx.session_id.clone(),
        description: entry.description,
    }
}

fn snapshot<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(error = %e, "could not snapshot audited value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuditCategory, AuditSeverity};
    use crate::service::testing::{DownBackend, MemoryBackend};
    use assettrack_kv::MemoryStore;
    use serde_json::json;

    fn logger(capacity: usize) -> AuditLogger {
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), None);
        AuditLogger::new(Arc::new(facade), capacity)
    }

    #[tokio::test]
    async fn local_trail_keeps_newest_entries() {
        let audit = logger(DEFAULT_CAPACITY);
        let ctx = AuditContext::new("U1", "Admin");
        for i in 0..1001 {
            let entry = NewAuditEntry::new("view_asset", "asset").entity_id(format!("{}", i));
            assert!(audit.log(&ctx, entry).await.is_some());
        }

        let stored: Vec<AuditLog> = audit
            .store
            .local()
            .collection(AuditLog::DOCUMENT, AuditLog::COLLECTION);
        assert_eq!(stored.len(), 1000);
        assert_eq!(stored[0].entity_id.as_deref(), Some("1000"));
        assert_eq!(stored[999].entity_id.as_deref(), Some("1"));
        assert!(stored.iter().all(|l| l.entity_id.as_deref() != Some("0")));
    }

    #[tokio::test]
    async fn derived_and_explicit_fields() {
        let audit = logger(10);
        let ctx = AuditContext::new("U2", "Maria").with_session("S-9");

        let derived = audit
            .log(&ctx, NewAuditEntry::new("delete_asset", "asset"))
            .await
            .unwrap();
        assert_eq!(derived.severity, AuditSeverity::High);
        assert_eq!(derived.category, AuditCategory::Delete);
        assert_eq!(derived.session_id.as_deref(), Some("S-9"));

        let mut explicit = NewAuditEntry::new("delete_asset", "asset");
        explicit.severity = Some(AuditSeverity::Critical);
        explicit.category = Some(AuditCategory::System);
        let stored = audit.log(&ctx, explicit).await.unwrap();
        assert_eq!(stored.severity, AuditSeverity::Critical);
        assert_eq!(stored.category, AuditCategory::System);
    }

    #[tokio::test]
    async fn explicit_severity_cannot_downgrade_deletes() {
        let audit = logger(10);
        let ctx = AuditContext::system();

        let mut entry = NewAuditEntry::new("delete_asset", "asset");
        entry.severity = Some(AuditSeverity::Low);
        let stored = audit.log(&ctx, entry).await.unwrap();
        assert!(stored.severity >= AuditSeverity::High);

        let mut entry = NewAuditEntry::new("view_asset", "asset");
        entry.severity = Some(AuditSeverity::Medium);
        let stored = audit.log(&ctx, entry).await.unwrap();
        assert_eq!(stored.severity, AuditSeverity::Medium);
    }

    #[tokio::test]
    async fn snapshots_and_query() {
        let audit = logger(10);
        let ctx = AuditContext::system();
        audit
            .log_update(&ctx, "asset", "A1", &json!({"status": "In Storage"}), &json!({"status": "In Use"}))
            .await
            .unwrap();
        audit
            .log_delete(&ctx, "user", "U9", &json!({"name": "Old account"}))
            .await
            .unwrap();

        let all = audit.get_audit_logs(&AuditQuery::default()).await.unwrap();
        assert_eq!(all.total, 2);

        let deletes = audit
            .get_audit_logs(&AuditQuery {
                category: Some(AuditCategory::Delete),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(deletes.total, 1);
        assert_eq!(deletes.items[0].old_values, Some(json!({"name": "Old account"})));
        assert!(deletes.items[0].new_values.is_none());

        let stats = audit.get_audit_stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unique_users, 1);
        assert_eq!(stats.last24h, 2);
    }

    #[tokio::test]
    async fn remote_sink_and_fallback() {
        let backend = Arc::new(MemoryBackend::default());
        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), Some(backend.clone()));
        let audit = AuditLogger::new(Arc::new(facade), 10);
        audit
            .log(&AuditContext::system(), NewAuditEntry::new("create_asset", "asset"))
            .await
            .unwrap();
        let rows = backend.rows("audit_logs");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["entity_type"], "asset");

        let facade = StorageFacade::new(Arc::new(MemoryStore::new()), Some(Arc::new(DownBackend)));
        let audit = AuditLogger::new(Arc::new(facade), 10);
        assert!(
            audit
                .log(&AuditContext::system(), NewAuditEntry::new("login", "session"))
                .await
                .is_some()
        );
        assert_eq!(audit.entries().await.unwrap().len(), 1);
    }
}
