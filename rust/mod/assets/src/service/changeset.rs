//! Type-erased writes, so that one logical operation touching several
//! record types can run as a unit on either store.

use assettrack_core::ServiceError;
use assettrack_remote::{RemoteBackend, RemoteError, Row};
use serde_json::Value;
use tracing::debug;

use crate::store::{Document, Entity, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
    Delete,
}

/// A record as it is stored locally and as it is sent to the backend.
#[derive(Debug, Clone)]
struct Image {
    local: Value,
    row: Row,
}

impl Image {
    fn of<T: Entity>(record: &T) -> Result<Self, ServiceError> {
        Ok(Self {
            local: serde_json::to_value(record)?,
            row: record.to_row()?,
        })
    }
}

/// One write against one record.
#[derive(Debug, Clone)]
pub struct WriteOp {
    kind: WriteKind,
    label: &'static str,
    document: Document,
    collection: &'static str,
    table: &'static str,
    id: String,
    before: Option<Image>,
    after: Option<Image>,
}

impl WriteOp {
    pub fn insert<T: Entity>(record: &T) -> Result<Self, ServiceError> {
        Ok(Self::new::<T>(WriteKind::Insert, record.id(), None, Some(Image::of(record)?)))
    }

    pub fn update<T: Entity>(before: &T, after: &T) -> Result<Self, ServiceError> {
        Ok(Self::new::<T>(
            WriteKind::Update,
            after.id(),
            Some(Image::of(before)?),
            Some(Image::of(after)?),
        ))
    }

    pub fn delete<T: Entity>(before: &T) -> Result<Self, ServiceError> {
        Ok(Self::new::<T>(WriteKind::Delete, before.id(), Some(Image::of(before)?), None))
    }

    fn new<T: Entity>(
        kind: WriteKind,
        id: &str,
        before: Option<Image>,
        after: Option<Image>,
    ) -> Self {
        Self {
            kind,
            label: T::LABEL,
            document: T::DOCUMENT,
            collection: T::COLLECTION,
            table: T::TABLE,
            id: id.to_string(),
            before,
            after,
        }
    }

    pub fn kind(&self) -> WriteKind {
        self.kind
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The write that undoes this one.
    pub fn inverse(&self) -> WriteOp {
        let kind = match self.kind {
            WriteKind::Insert => WriteKind::Delete,
            WriteKind::Update => WriteKind::Update,
            WriteKind::Delete => WriteKind::Insert,
        };
        WriteOp {
            kind,
            before: self.after.clone(),
            after: self.before.clone(),
            id: self.id.clone(),
            ..*self
        }
    }

    fn after(&self) -> Result<&Image, ServiceError> {
        self.after.as_ref().ok_or_else(|| {
            ServiceError::Internal(format!("{} write for '{}' has no record", self.label, self.id))
        })
    }

    /// Apply against a local working copy. Inserting an existing id is a
    /// conflict. Updating a record only the backend knew stores it; deleting
    /// one is a no-op.
    pub fn apply_local(&self, tx: &mut Transaction) -> Result<(), ServiceError> {
        let items = tx.collection_mut(self.document, self.collection)?;
        let position = items
            .iter()
            .position(|item| item.get("id").and_then(Value::as_str) == Some(self.id.as_str()));
        match (self.kind, position) {
            (WriteKind::Insert, Some(_)) => {
                return Err(ServiceError::Conflict(format!(
                    "{} '{}' already exists",
                    self.label, self.id
                )));
            }
            (WriteKind::Insert, None) => items.push(self.after()?.local.clone()),
            (WriteKind::Update, Some(i)) => items[i] = self.after()?.local.clone(),
            (WriteKind::Update, None) => {
                debug!(table = self.table, id = %self.id, "update of unknown local record, inserting");
                items.push(self.after()?.local.clone());
            }
            (WriteKind::Delete, Some(i)) => {
                items.remove(i);
            }
            (WriteKind::Delete, None) => {
                debug!(table = self.table, id = %self.id, "delete of unknown local record");
            }
        }
        Ok(())
    }

    /// Apply against the backend. Returns the stored row for inserts and
    /// updates.
    pub async fn apply_remote(
        &self,
        remote: &dyn RemoteBackend,
    ) -> Result<Option<Row>, RemoteError> {
        let missing = || RemoteError::Decode(format!("{} write has no record", self.label));
        match self.kind {
            WriteKind::Insert => {
                let image = self.after.as_ref().ok_or_else(missing)?;
                remote.insert(self.table, &image.row).await.map(Some)
            }
            WriteKind::Update => {
                let image = self.after.as_ref().ok_or_else(missing)?;
                remote.update(self.table, &self.id, &image.row).await.map(Some)
            }
            WriteKind::Delete => remote.delete(self.table, &self.id).await.map(|_| None),
        }
    }
}
