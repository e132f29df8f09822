use axum::extract::{Query, State};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use assettrack_core::ServiceError;

use super::{Actor, AppState, csv_attachment};
use crate::exchange::export_assets;
use crate::model::{Asset, NewAuditEntry};
use crate::service::{AssetFilter, ImportReport};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/assets", get(list_assets))
        .route("/assets/export", get(export))
        .route("/assets/import", post(import))
}

async fn list_assets(
    State(state): State<AppState>,
    Query(filter): Query<AssetFilter>,
) -> Result<Json<Value>, ServiceError> {
    let assets: Vec<Asset> = state
        .store
        .get_assets()
        .await?
        .into_iter()
        .filter(|a| filter.matches(a))
        .collect();
    Ok(Json(json!({
        "total": assets.len(),
        "items": assets,
    })))
}

async fn export(State(state): State<AppState>, Actor(ctx): Actor) -> Result<Response, ServiceError> {
    let assets = state.store.get_assets().await?;
    let body = export_assets(&assets)?;
    state
        .audit
        .log(
            &ctx,
            NewAuditEntry::new("export_assets", "asset")
                .description(format!("Exported {} assets", assets.len())),
        )
        .await;
    Ok(csv_attachment("assets.csv", body))
}

async fn import(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    body: String,
) -> Result<Json<ImportReport<Asset>>, ServiceError> {
    let report = state.store.import_assets(&body).await?;
    state
        .audit
        .log(
            &ctx,
            NewAuditEntry::new("import_assets", "asset").description(format!(
                "Imported {} assets, {} rows rejected",
                report.rows.len(),
                report.errors.len()
            )),
        )
        .await;
    Ok(Json(report))
}
