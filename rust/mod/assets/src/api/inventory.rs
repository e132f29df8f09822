use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};

use assettrack_core::ServiceError;

use super::{Actor, AppState, csv_attachment};
use crate::exchange::export_inventory;
use crate::model::{InventoryItem, NewAuditEntry};
use crate::service::ImportReport;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory/export", get(export))
        .route("/inventory/import", post(import))
}

async fn export(State(state): State<AppState>, Actor(ctx): Actor) -> Result<Response, ServiceError> {
    let items = state.store.get_inventory().await?;
    let body = export_inventory(&items)?;
    state
        .audit
        .log(
            &ctx,
            NewAuditEntry::new("export_inventory", "inventory")
                .description(format!("Exported {} inventory items", items.len())),
        )
        .await;
    Ok(csv_attachment("inventory.csv", body))
}

async fn import(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    body: String,
) -> Result<Json<ImportReport<InventoryItem>>, ServiceError> {
    let report = state.store.import_inventory(&body).await?;
    state
        .audit
        .log(
            &ctx,
            NewAuditEntry::new("import_inventory", "inventory").description(format!(
                "Imported {} inventory items, {} rows rejected",
                report.rows.len(),
                report.errors.len()
            )),
        )
        .await;
    Ok(Json(report))
}
