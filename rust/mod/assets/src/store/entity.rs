//! The storage contract every persisted record implements.

use assettrack_core::ServiceError;
use assettrack_remote::Row;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Document;

/// Trait implemented by records to declare where and how they are stored.
///
/// Locally a record lives in one array (`COLLECTION`) of one JSON document
/// (`DOCUMENT`) in its camelCase shape. Remotely it is one row of `TABLE`
/// with snake_case columns and enumerations spelled as backend codes.
/// Hooks have default no-op impls.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Human name used in messages: "asset", "user", ...
    const LABEL: &'static str;
    const COLLECTION: &'static str;
    const TABLE: &'static str;
    const DOCUMENT: Document = Document::Main;
    /// Remote column to list newest-first by, if the table has one.
    const ORDER_BY: Option<&'static str> = None;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Called before inserting a new record. Use for auto-fill (timestamps).
    fn before_create(&mut self) {}

    /// Called before writing an updated record.
    fn before_update(&mut self) {}

    /// Rewrite domain spellings into backend spellings, in place.
    fn encode_row(_row: &mut Row) {}

    /// Rewrite backend spellings into domain spellings, in place.
    fn decode_row(_row: &mut Row) {}

    /// Backend representation of this record.
    fn to_row(&self) -> Result<Row, ServiceError> {
        let Value::Object(fields) = serde_json::to_value(self)? else {
            return Err(ServiceError::Internal(format!(
                "{} does not serialize to an object",
                Self::LABEL
            )));
        };
        let mut row: Row = fields
            .into_iter()
            .map(|(k, v)| (snake_case(&k), v))
            .collect();
        Self::encode_row(&mut row);
        Ok(row)
    }

    /// Domain record from a backend row.
    fn from_row(mut row: Row) -> Result<Self, ServiceError> {
        Self::decode_row(&mut row);
        let fields: serde_json::Map<String, Value> = row
            .into_iter()
            .map(|(k, v)| (camel_case(&k), v))
            .collect();
        serde_json::from_value(Value::Object(fields)).map_err(|e| {
            ServiceError::Internal(format!("decode {} row: {}", Self::LABEL, e))
        })
    }
}

/// Replace a string column through `map`. Unknown spellings are left alone.
pub fn remap(row: &mut Row, column: &str, map: fn(&str) -> Option<&'static str>) {
    if let Some(Value::String(current)) = row.get(column) {
        if let Some(mapped) = map(current) {
            row.insert(column.to_string(), Value::String(mapped.to_string()));
        }
    }
}

/// `assetId` → `asset_id`.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `asset_id` → `assetId`.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
