use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use assettrack_core::{ListResult, ServiceError};

use super::AppState;
use crate::model::{AuditLog, AuditQuery, AuditStats};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(list_logs))
        .route("/audit-logs/stats", get(stats))
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<ListResult<AuditLog>>, ServiceError> {
    Ok(Json(state.audit.get_audit_logs(&query).await?))
}

async fn stats(State(state): State<AppState>) -> Result<Json<AuditStats>, ServiceError> {
    Ok(Json(state.audit.get_audit_stats().await?))
}

#[cfg(test)]
mod tests {
    use super::super::build_router;
    use super::super::testing::{api, state};
    use crate::audit::AuditContext;
    use crate::model::NewAuditEntry;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn browse_and_stats() {
        let state = state();
        let ctx = AuditContext::new("U2", "Maria Santos");
        for action in ["login", "create_asset", "delete_asset", "delete_user"] {
            state.audit.log(&ctx, NewAuditEntry::new(action, "asset")).await;
        }
        let router = build_router(state);

        let (s, body) = api(&router, "GET", "/audit-logs?severity=high&limit=1", None).await;
        assert_eq!(s, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["items"].as_array().unwrap().len(), 1);

        let (_, body) = api(&router, "GET", "/audit-logs?q=maria&category=auth", None).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["action"], "login");

        let (s, body) = api(&router, "GET", "/audit-logs/stats", None).await;
        assert_eq!(s, StatusCode::OK);
        assert_eq!(body["total"], 4);
        assert_eq!(body["bySeverity"]["high"], 2);
        assert_eq!(body["uniqueUsers"], 1);
        assert_eq!(body["byHour"].as_array().unwrap().len(), 24);
        assert_eq!(body["topActions"].as_array().unwrap().len(), 4);
    }
}
