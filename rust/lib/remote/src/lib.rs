//! Remote backend adapter.
//!
//! A thin, table-scoped client for a hosted PostgREST-style relational API
//! (`{url}/rest/v1/{table}`). The storage facade talks to the backend only
//! through the [`RemoteBackend`] trait, so tests inject in-memory or failing
//! implementations instead of a live server.
//!
//! # Usage
//!
//! ```ignore
//! use assettrack_remote::{PostgrestClient, RemoteConfig, RemoteBackend, Select};
//!
//! if let Some(config) = RemoteConfig::from_env() {
//!     let client = PostgrestClient::new(config)?;
//!     let rows = client.select("assets", &Select::all()).await?;
//! }
//! ```

mod client;
mod config;
mod error;
mod select;

pub use client::PostgrestClient;
pub use config::{RemoteConfig, ENV_KEY, ENV_URL};
pub use error::RemoteError;
pub use select::Select;

/// A backend row: column name → JSON value, in the backend's own naming.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Table-scoped CRUD verbs exposed by the hosted backend.
#[async_trait::async_trait]
pub trait RemoteBackend: Send + Sync + 'static {
    /// Fetch rows from `table` matching `select`.
    async fn select(&self, table: &str, select: &Select) -> Result<Vec<Row>, RemoteError>;

    /// Insert one row and return the stored representation.
    async fn insert(&self, table: &str, row: &Row) -> Result<Row, RemoteError>;

    /// Patch the row whose `id` column equals `id`; returns the updated row.
    async fn update(&self, table: &str, id: &str, patch: &Row) -> Result<Row, RemoteError>;

    /// Delete the row whose `id` column equals `id`.
    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError>;
}
