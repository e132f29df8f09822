use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{RemoteBackend, RemoteConfig, RemoteError, Row, Select};

/// HTTP client for a PostgREST-style backend.
pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
}

impl PostgrestClient {
    /// Build a client with the access key baked into default headers.
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.key)
            .map_err(|e| RemoteError::Decode(format!("access key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|e| RemoteError::Decode(format!("access key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn id_filter(id: &str) -> [(&'static str, String); 1] {
        [("id", format!("eq.{}", id))]
    }

    /// Parse a response, mapping non-2xx statuses to `RemoteError::Server`.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, RemoteError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Server { status: code, message: body });
        }
        resp.json::<R>()
            .await
            .map_err(|e| RemoteError::Decode(format!("response body: {}", e)))
    }

    /// PostgREST answers writes with an array; take its single element.
    fn single(table: &str, id: &str, mut rows: Vec<Row>) -> Result<Row, RemoteError> {
        if rows.is_empty() {
            return Err(RemoteError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(rows.swap_remove(0))
    }
}

#[async_trait::async_trait]
impl RemoteBackend for PostgrestClient {
    async fn select(&self, table: &str, select: &Select) -> Result<Vec<Row>, RemoteError> {
        debug!(table, "remote select");
        let resp = self
            .http
            .get(self.table_url(table))
            .query(&select.to_query())
            .send()
            .await?;
        Self::parse(resp).await
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<Row, RemoteError> {
        debug!(table, "remote insert");
        let resp = self.http.post(self.table_url(table)).json(row).send().await?;
        let rows: Vec<Row> = Self::parse(resp).await?;
        let id = row.get("id").and_then(|v| v.as_str()).unwrap_or_default();
        Self::single(table, id, rows)
    }

    async fn update(&self, table: &str, id: &str, patch: &Row) -> Result<Row, RemoteError> {
        debug!(table, id, "remote update");
        let resp = self
            .http
            .patch(self.table_url(table))
            .query(&Self::id_filter(id))
            .json(patch)
            .send()
            .await?;
        let rows: Vec<Row> = Self::parse(resp).await?;
        Self::single(table, id, rows)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteError> {
        debug!(table, id, "remote delete");
        let resp = self
            .http
            .delete(self.table_url(table))
            .query(&Self::id_filter(id))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Server { status: code, message: body });
        }
        Ok(())
    }
}
