//! The storage facade: one entry point that tries the hosted backend and
//! falls back to the local store.
//!
//! Every operation follows the same contract:
//! 1. With a backend configured, attempt the remote call and normalize the
//!    returned rows into domain records.
//! 2. On any remote error, or with no backend, run the same operation
//!    against the local store.
//! 3. Callers get the same shape either way. Writes report where the data
//!    landed through [`Persisted::origin`]; nothing is retried or
//!    reconciled later.

pub mod assets;
pub mod changeset;
pub mod custody;
pub mod disposal;
pub mod import;
pub mod inventory;
pub mod maintenance;
pub mod users;

use std::sync::Arc;

use assettrack_core::{ServiceError, merge_patch, new_id};
use assettrack_kv::KVStore;
use assettrack_remote::{RemoteBackend, RemoteError, Row, Select};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::store::{Entity, LocalStore};

pub use assets::AssetFilter;
pub use changeset::{WriteKind, WriteOp};
pub use import::ImportReport;

/// Which store accepted a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Remote,
    LocalFallback,
}

/// A written record and where it was written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Persisted<T> {
    pub value: T,
    pub origin: Origin,
}

impl<T> Persisted<T> {
    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Persisted<U> {
        Persisted {
            value: f(self.value),
            origin: self.origin,
        }
    }
}

/// Outcome of a changeset: the origin, and for a remote run the row each
/// write returned.
pub(crate) struct Applied {
    pub origin: Origin,
    pub rows: Vec<Option<Row>>,
}

impl Applied {
    /// The record written by the `index`th op, preferring the backend's
    /// representation when there is one.
    pub fn record<T: Entity>(&self, index: usize, sent: T) -> T {
        match self.rows.get(index).cloned().flatten() {
            Some(row) => T::from_row(row).unwrap_or_else(|e| {
                warn!(table = T::TABLE, error = %e, "backend returned an undecodable row");
                sent
            }),
            None => sent,
        }
    }
}

fn fallback(table: &str, op: &str, error: &RemoteError) {
    warn!(table, op, error = %error, "remote backend failed, falling back to local store");
}

fn decode_rows<T: Entity>(rows: Vec<Row>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter()
        .map(|row| T::from_row(row).map_err(|e| RemoteError::Decode(e.to_string())))
        .collect()
}

/// Storage facade over the local store and an optional hosted backend.
pub struct StorageFacade {
    local: LocalStore,
    remote: Option<Arc<dyn RemoteBackend>>,
}

impl StorageFacade {
    pub fn new(kv: Arc<dyn KVStore>, remote: Option<Arc<dyn RemoteBackend>>) -> Self {
        if remote.is_none() {
            debug!("no remote backend configured, using local store only");
        }
        Self {
            local: LocalStore::new(kv),
            remote,
        }
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    pub fn remote(&self) -> Option<&dyn RemoteBackend> {
        self.remote.as_deref()
    }

    // ── Generic verbs ──

    /// All records of one type.
    pub async fn list<T: Entity>(&self) -> Result<Vec<T>, ServiceError> {
        if let Some(remote) = self.remote() {
            let mut select = Select::all();
            if let Some(column) = T::ORDER_BY {
                select = select.order_desc(column);
            }
            match remote.select(T::TABLE, &select).await {
                Ok(rows) => match decode_rows(rows) {
                    Ok(items) => return Ok(items),
                    Err(e) => fallback(T::TABLE, "select", &e),
                },
                Err(e) => fallback(T::TABLE, "select", &e),
            }
        }
        Ok(self.local.collection(T::DOCUMENT, T::COLLECTION))
    }

    /// One record by id, or `None`. A backend that answers with no row is
    /// authoritative; only a failing backend falls back.
    pub async fn find<T: Entity>(&self, id: &str) -> Result<Option<T>, ServiceError> {
        if let Some(remote) = self.remote() {
            match remote.select(T::TABLE, &Select::by_id(id).limit(1)).await {
                Ok(rows) => match decode_rows::<T>(rows) {
                    Ok(items) => return Ok(items.into_iter().next()),
                    Err(e) => fallback(T::TABLE, "select", &e),
                },
                Err(e) => fallback(T::TABLE, "select", &e),
            }
        }
        Ok(self
            .local
            .collection::<T>(T::DOCUMENT, T::COLLECTION)
            .into_iter()
            .find(|r| r.id() == id))
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<T, ServiceError> {
        self.find(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("{} '{}' not found", T::LABEL, id)))
    }

    /// Insert a record. A blank id is generated; `before_create` runs first.
    pub async fn create<T: Entity>(&self, mut record: T) -> Result<Persisted<T>, ServiceError> {
        if record.id().trim().is_empty() {
            record.set_id(new_id());
        }
        record.before_create();
        let applied = self.apply(vec![WriteOp::insert(&record)?]).await?;
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, record),
        })
    }

    /// Merge-patch a record without further validation.
    pub async fn update<T: Entity>(&self, id: &str, patch: &Value) -> Result<Persisted<T>, ServiceError> {
        let current: T = self.get(id).await?;
        let next = patched(&current, patch)?;
        self.replace(&current, next).await
    }

    /// Write `next` over `current`. `before_update` runs first.
    pub async fn replace<T: Entity>(&self, current: &T, mut next: T) -> Result<Persisted<T>, ServiceError> {
        next.before_update();
        let applied = self.apply(vec![WriteOp::update(current, &next)?]).await?;
        Ok(Persisted {
            origin: applied.origin,
            value: applied.record(0, next),
        })
    }

    /// Delete a record, returning what was removed.
    pub async fn delete<T: Entity>(&self, id: &str) -> Result<Persisted<T>, ServiceError> {
        let current: T = self.get(id).await?;
        let applied = self.apply(vec![WriteOp::delete(&current)?]).await?;
        Ok(Persisted {
            origin: applied.origin,
            value: current,
        })
    }

    // ── Changesets ──

    /// Run several writes as one unit.
    ///
    /// Remotely the writes go out in order; if one fails, the ones already
    /// accepted are undone with their inverse writes and the whole set is
    /// applied locally instead. Locally the set runs in one transaction.
    pub(crate) async fn apply(&self, ops: Vec<WriteOp>) -> Result<Applied, ServiceError> {
        if let Some(remote) = self.remote() {
            match apply_remote(remote, &ops).await {
                Ok(rows) => {
                    return Ok(Applied {
                        origin: Origin::Remote,
                        rows,
                    });
                }
                Err((op, e)) => fallback(op.table(), op_name(op.kind()), &e),
            }
        }
        self.local.transact(|tx| {
            for op in &ops {
                op.apply_local(tx)?;
            }
            Ok(())
        })?;
        Ok(Applied {
            origin: Origin::LocalFallback,
            rows: Vec::new(),
        })
    }
}

fn op_name(kind: WriteKind) -> &'static str {
    match kind {
        WriteKind::Insert => "insert",
        WriteKind::Update => "update",
        WriteKind::Delete => "delete",
    }
}

async fn apply_remote<'a>(
    remote: &dyn RemoteBackend,
    ops: &'a [WriteOp],
) -> Result<Vec<Option<Row>>, (&'a WriteOp, RemoteError)> {
    let mut rows = Vec::with_capacity(ops.len());
    for (i, op) in ops.iter().enumerate() {
        match op.apply_remote(remote).await {
            Ok(row) => rows.push(row),
            Err(e) => {
                for done in ops[..i].iter().rev() {
                    let undo = done.inverse();
                    if let Err(undo_err) = undo.apply_remote(remote).await {
                        warn!(
                            table = undo.table(),
                            id = undo.id(),
                            error = %undo_err,
                            "compensating remote write failed"
                        );
                    }
                }
                return Err((op, e));
            }
        }
    }
    Ok(rows)
}

/// `current` with `patch` merged in (RFC 7386). The id cannot change.
pub fn patched<T: Entity>(current: &T, patch: &Value) -> Result<T, ServiceError> {
    if !patch.is_object() {
        return Err(ServiceError::Validation("patch must be a JSON object".into()));
    }
    if let Some(id) = patch.get("id") {
        if id.as_str() != Some(current.id()) {
            return Err(ServiceError::Validation(format!(
                "{} id cannot be changed",
                T::LABEL
            )));
        }
    }
    let mut base = serde_json::to_value(current)?;
    merge_patch(&mut base, patch);
    serde_json::from_value(base)
        .map_err(|e| ServiceError::Validation(format!("invalid {}: {}", T::LABEL, e)))
}

/// Require a non-blank string field.
pub(crate) fn required(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    //! Backends injected into the facade by tests.

    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assettrack_remote::{RemoteBackend, RemoteError, Row, Select};
    use serde_json::Value;

    /// In-memory tables, optionally failing every insert and update after
    /// `fail_after` successful ones. Deletes always succeed.
    #[derive(Default)]
    pub struct MemoryBackend {
        pub tables: Mutex<BTreeMap<String, Vec<Row>>>,
        pub fail_after: Option<usize>,
        writes: AtomicUsize,
    }

    impl MemoryBackend {
        pub fn failing_after(n: usize) -> Self {
            Self {
                fail_after: Some(n),
                ..Default::default()
            }
        }

        pub fn rows(&self, table: &str) -> Vec<Row> {
            self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
        }

        fn check_write(&self) -> Result<(), RemoteError> {
            let n = self.writes.fetch_add(1, Ordering::SeqCst);
            match self.fail_after {
                Some(limit) if n >= limit => Err(RemoteError::Server {
                    status: 503,
                    message: "unavailable".into(),
                }),
                _ => Ok(()),
            }
        }
    }

    fn id_of(row: &Row) -> Option<&str> {
        row.get("id").and_then(Value::as_str)
    }

    #[async_trait::async_trait]
    impl RemoteBackend for MemoryBackend {
        async fn select(&self, table: &str, select: &Select) -> Result<Vec<Row>, RemoteError> {
            let tables = self.tables.lock().unwrap();
            let rows = tables.get(table).cloned().unwrap_or_default();
            Ok(rows
                .into_iter()
                .filter(|row| {
                    select
                        .filters
                        .iter()
                        .all(|(col, val)| row.get(col).and_then(Value::as_str) == Some(val.as_str()))
                })
                .collect())
        }

        async fn insert(&self, table: &str, row: &Row) -> Result<Row, RemoteError> {
            self.check_write()?;
            let mut tables = self.tables.lock().unwrap();
            tables.entry(table.to_string()).or_default().push(row.clone());
            Ok(row.clone())
        }

        async fn update(&self, table: &str, id: &str, patch: &Row) -> Result<Row, RemoteError> {
            self.check_write()?;
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(table.to_string()).or_default();
            let row = rows
                .iter_mut()
                .find(|r| id_of(r) == Some(id))
                .ok_or_else(|| RemoteError::NotFound {
                    table: table.to_string(),
                    id: id.to_string(),
                })?;
            for (k, v) in patch {
                row.insert(k.clone(), v.clone());
            }
            Ok(row.clone())
        }

        async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError> {
            let mut tables = self.tables.lock().unwrap();
            if let Some(rows) = tables.get_mut(table) {
                rows.retain(|r| id_of(r) != Some(id));
            }
            Ok(())
        }
    }

    /// A backend that is configured but never reachable.
    pub struct DownBackend;

    fn down() -> RemoteError {
        RemoteError::Server {
            status: 503,
            message: "connection refused".into(),
        }
    }

    #[async_trait::async_trait]
    impl RemoteBackend for DownBackend {
        async fn select(&self, _: &str, _: &Select) -> Result<Vec<Row>, RemoteError> {
            Err(down())
        }

        async fn insert(&self, _: &str, _: &Row) -> Result<Row, RemoteError> {
            Err(down())
        }

        async fn update(&self, _: &str, _: &str, _: &Row) -> Result<Row, RemoteError> {
            Err(down())
        }

        async fn delete(&self, _: &str, _: &str) -> Result<(), RemoteError> {
            Err(down())
        }
    }
}
