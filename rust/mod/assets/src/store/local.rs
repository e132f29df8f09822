//! Local persistence: one JSON document per dataset, replaced in full on
//! every write.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Arc, Mutex};

use assettrack_core::ServiceError;
use assettrack_kv::{KVError, KVStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// The fixed datasets kept in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Document {
    /// Assets, assignments, transfers, maintenance, inventory and users.
    Main,
    Disposals,
    AuditLogs,
}

impl Document {
    pub fn key(&self) -> &'static str {
        match self {
            Document::Main => "asset-tracker-data",
            Document::Disposals => "asset-tracker-disposals",
            Document::AuditLogs => "asset-tracker-audit-logs",
        }
    }
}

const DOCUMENT_PREFIX: &str = "asset-tracker-";

pub(crate) fn kv_err(e: KVError) -> ServiceError {
    ServiceError::Storage(e.to_string())
}

/// Handle on a single stored JSON object.
#[derive(Clone)]
pub struct LocalDocument {
    kv: Arc<dyn KVStore>,
    key: &'static str,
}

impl LocalDocument {
    pub fn new(kv: Arc<dyn KVStore>, key: &'static str) -> Self {
        Self { kv, key }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Whether anything has ever been stored under this key.
    pub fn exists(&self) -> Result<bool, ServiceError> {
        Ok(self.kv.get(self.key).map_err(kv_err)?.is_some())
    }

    /// Parse the stored document. Absent, unreadable or corrupt data all
    /// read as an empty object.
    pub fn load(&self) -> Map<String, Value> {
        self.read().unwrap_or_else(|e| {
            warn!(key = self.key, error = %e, "local document unreadable, using empty");
            Map::new()
        })
    }

    /// Like [`load`](Self::load), but a failing store read is an error.
    /// Absent or corrupt data still reads as an empty object.
    pub fn read(&self) -> Result<Map<String, Value>, ServiceError> {
        let Some(bytes) = self.kv.get(self.key).map_err(kv_err)? else {
            return Ok(Map::new());
        };
        let map = match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!(key = self.key, "local document is not an object, using empty");
                Map::new()
            }
            Err(e) => {
                warn!(key = self.key, error = %e, "local document corrupt, using empty");
                Map::new()
            }
        };
        Ok(map)
    }

    /// Serialize and overwrite the stored value.
    pub fn save(&self, document: &Map<String, Value>) -> Result<(), ServiceError> {
        let bytes = serde_json::to_vec(document)?;
        self.kv.set(self.key, &bytes).map_err(kv_err)?;
        debug!(key = self.key, bytes = bytes.len(), "saved local document");
        Ok(())
    }
}

/// Typed view of one top-level array. Entries that no longer decode are
/// skipped with a warning.
fn decode_collection<T: DeserializeOwned>(doc: &Map<String, Value>, name: &str) -> Vec<T> {
    let Some(Value::Array(items)) = doc.get(name) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(collection = name, error = %e, "skipping undecodable local record");
                None
            }
        })
        .collect()
}

/// All local documents behind one lock.
///
/// Every read-modify-write in the process goes through [`LocalStore::transact`]
/// or [`LocalStore::update_collection`], so concurrent callers never lose each
/// other's writes.
pub struct LocalStore {
    kv: Arc<dyn KVStore>,
    lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            lock: Mutex::new(()),
        }
    }

    pub fn document(&self, doc: Document) -> LocalDocument {
        LocalDocument::new(self.kv.clone(), doc.key())
    }

    pub fn load(&self, doc: Document) -> Map<String, Value> {
        self.document(doc).load()
    }

    /// Keys and sizes of the datasets present in the underlying store.
    pub fn stored_documents(&self) -> Result<Vec<(String, usize)>, ServiceError> {
        Ok(self
            .kv
            .scan(DOCUMENT_PREFIX)
            .map_err(kv_err)?
            .into_iter()
            .map(|(key, value)| (key, value.len()))
            .collect())
    }

    pub fn save(&self, doc: Document, document: &Map<String, Value>) -> Result<(), ServiceError> {
        let _guard = self.guard()?;
        self.document(doc).save(document)
    }

    /// Read the whole document, replace one array, write it back.
    pub fn update_collection(
        &self,
        doc: Document,
        name: &str,
        items: Vec<Value>,
    ) -> Result<(), ServiceError> {
        self.transact(|tx| {
            *tx.collection_mut(doc, name)? = items;
            Ok(())
        })
    }

    pub fn collection<T: DeserializeOwned>(&self, doc: Document, name: &str) -> Vec<T> {
        decode_collection(&self.load(doc), name)
    }

    /// Run `f` against working copies of the documents it touches, then
    /// persist every modified document. If `f` fails nothing is written; if
    /// a later save fails, documents already saved are put back.
    pub fn transact<R>(
        &self,
        f: impl FnOnce(&mut Transaction) -> Result<R, ServiceError>,
    ) -> Result<R, ServiceError> {
        let _guard = self.guard()?;
        let mut tx = Transaction {
            store: self,
            docs: BTreeMap::new(),
        };
        let out = f(&mut tx)?;
        tx.commit()?;
        Ok(out)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, ServiceError> {
        self.lock
            .lock()
            .map_err(|_| ServiceError::Storage("local store lock poisoned".into()))
    }
}

/// Working copies of the documents touched inside [`LocalStore::transact`].
pub struct Transaction<'a> {
    store: &'a LocalStore,
    docs: BTreeMap<Document, Working>,
}

struct Working {
    original: Map<String, Value>,
    current: Map<String, Value>,
}

impl Transaction<'_> {
    fn working(&mut self, doc: Document) -> Result<&mut Working, ServiceError> {
        let working = match self.docs.entry(doc) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let original = self.store.document(doc).read()?;
                entry.insert(Working {
                    current: original.clone(),
                    original,
                })
            }
        };
        Ok(working)
    }

    /// Mutable access to one top-level array, created empty if missing.
    pub fn collection_mut(
        &mut self,
        doc: Document,
        name: &str,
    ) -> Result<&mut Vec<Value>, ServiceError> {
        let current = &mut self.working(doc)?.current;
        if !current.get(name).is_some_and(Value::is_array) {
            if current.contains_key(name) {
                warn!(collection = name, "replacing non-array collection");
            }
            current.insert(name.to_string(), Value::Array(Vec::new()));
        }
        current
            .get_mut(name)
            .and_then(Value::as_array_mut)
            .ok_or_else(|| ServiceError::Internal(format!("collection '{}' unavailable", name)))
    }

    pub fn put_records<T: Serialize>(
        &mut self,
        doc: Document,
        name: &str,
        records: &[T],
    ) -> Result<(), ServiceError> {
        let items = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        *self.collection_mut(doc, name)? = items;
        Ok(())
    }

    fn commit(self) -> Result<(), ServiceError> {
        let mut saved: Vec<(Document, Map<String, Value>)> = Vec::new();
        for (doc, working) in self.docs {
            if working.current == working.original {
                continue;
            }
            let handle = self.store.document(doc);
            if let Err(e) = handle.save(&working.current) {
                for (done, original) in saved.iter().rev() {
                    if let Err(restore) = self.store.document(*done).save(original) {
                        warn!(key = done.key(), error = %restore, "failed to restore local document");
                    }
                }
                return Err(e);
            }
            saved.push((doc, working.original));
        }
        Ok(())
    }
}
