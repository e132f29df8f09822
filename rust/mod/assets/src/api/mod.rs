mod assets;
mod audit;
mod inventory;
mod users;

use std::convert::Infallible;
use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};

use crate::audit::{AuditContext, AuditLogger};
use crate::service::StorageFacade;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StorageFacade>,
    pub audit: Arc<AuditLogger>,
}

/// Build the asset-tracking API router.
///
/// Routes are relative; the server nests them under `/api`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(users::routes())
        .merge(assets::routes())
        .merge(inventory::routes())
        .merge(audit::routes())
        .with_state(state)
}

/// The acting user, read from `x-user-id`, `x-user-name` and
/// `x-session-id`. Requests without them are attributed to `anonymous`.
pub struct Actor(pub AuditContext);

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Actor(actor_from_headers(&parts.headers)))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn actor_from_headers(headers: &HeaderMap) -> AuditContext {
    let id = header(headers, "x-user-id").unwrap_or("anonymous");
    let name = header(headers, "x-user-name").unwrap_or(id);
    let ctx = AuditContext::new(id, name);
    match header(headers, "x-session-id") {
        Some(session) => ctx.with_session(session),
        None => ctx,
    }
}

/// A CSV download.
pub(crate) fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::audit::DEFAULT_CAPACITY;
    use assettrack_kv::MemoryStore;

    pub fn state() -> AppState {
        let store = Arc::new(StorageFacade::new(Arc::new(MemoryStore::new()), None));
        let audit = Arc::new(AuditLogger::new(store.clone(), DEFAULT_CAPACITY));
        AppState { store, audit }
    }

    /// Send one request, returning the status and the raw body.
    pub async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        content_type: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, String) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "U1")
            .header("x-user-name", "Admin User");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let req = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn api(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let ct = body.as_ref().map(|_| "application/json");
        let (status, text) = send(router, method, uri, ct, body.map(|v| v.to_string())).await;
        let json = if text.is_empty() {
            serde_json::json!(null)
        } else {
            serde_json::from_str(&text).unwrap_or(serde_json::json!(null))
        };
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn actor_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(actor_from_headers(&headers), AuditContext::new("anonymous", "anonymous"));

        headers.insert("x-user-id", HeaderValue::from_static("U7"));
        headers.insert("x-session-id", HeaderValue::from_static("sess-1"));
        let ctx = actor_from_headers(&headers);
        assert_eq!(ctx.user_id, "U7");
        assert_eq!(ctx.user_name, "U7");
        assert_eq!(ctx.session_id.as_deref(), Some("sess-1"));
    }
}
