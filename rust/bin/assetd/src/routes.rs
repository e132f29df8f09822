//! Route registration: module routes under `/api` plus system endpoints.

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::info;

use assettrack_core::Module;

/// Build the complete router.
pub fn build_router(modules: &[Box<dyn Module>]) -> Router {
    let mut api = Router::new();
    for module in modules {
        info!("Mounting module {} under /api", module.name());
        api = api.merge(module.routes());
    }

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .nest("/api", api)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "assetd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assets::AssetsModule;
    use assets::audit::AuditLogger;
    use assets::service::StorageFacade;
    use assettrack_kv::MemoryStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let store = Arc::new(StorageFacade::new(Arc::new(MemoryStore::new()), None));
        let audit = Arc::new(AuditLogger::new(store.clone(), 100));
        let modules: Vec<Box<dyn Module>> = vec![Box::new(AssetsModule::new(store, audit))];
        build_router(&modules)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn system_and_module_routes() {
        let app = app();

        let (s, body) = get_json(&app, "/health").await;
        assert_eq!(s, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (_, body) = get_json(&app, "/version").await;
        assert_eq!(body["name"], "assetd");

        let (s, body) = get_json(&app, "/api/users").await;
        assert_eq!(s, StatusCode::OK);
        assert_eq!(body["total"], 0);

        let (s, _) = get_json(&app, "/users").await;
        assert_eq!(s, StatusCode::NOT_FOUND);
    }
}
