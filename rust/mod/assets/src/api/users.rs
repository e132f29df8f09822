use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};

use assettrack_core::{ListParams, ServiceError, paginate};

use super::{Actor, AppState};
use crate::model::{NewUser, UserProfile};

pub fn routes() -> Router<AppState> {
    Router::new().route("/users", get(list_users).post(create_user))
}

async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ServiceError> {
    let q = params.q.as_deref().map(str::to_lowercase);
    let users: Vec<UserProfile> = state
        .store
        .get_users()
        .await?
        .iter()
        .filter(|u| match q.as_deref() {
            Some(q) => [&u.name, &u.email, &u.department]
                .iter()
                .any(|f| f.to_lowercase().contains(q)),
            None => true,
        })
        .map(|u| u.profile())
        .collect();
    let result = paginate(users, params.limit, params.offset);
    Ok(Json(json!({
        "items": result.items,
        "total": result.total,
    })))
}

async fn create_user(
    State(state): State<AppState>,
    Actor(ctx): Actor,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let user = state.store.create_user(input).await?.into_inner().profile();
    state.audit.log_create(&ctx, "user", &user.id, &user).await;
    Ok((StatusCode::CREATED, Json(serde_json::to_value(user)?)))
}
