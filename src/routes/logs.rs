use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::auth::middleware::AdminUser;
use crate::entities::log_entry;
use crate::error::AppError;
use crate::services::LogService;
use crate::state::AppState;

/// Build the audit route group: `/Logger/...`. Every route requires an admin.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries))
        .route("/user/{user_id}", get(list_user_entries))
        .route("/entity/{entity_type}", get(list_entity_entries))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogEntryResponse {
    id: i32,
    user_id: i32,
    user_role: String,
    action: String,
    entity_type: String,
    entity_id: i32,
    entity_name: String,
    details: String,
    created_at: String,
}

fn entry_response(e: log_entry::Model) -> LogEntryResponse {
    LogEntryResponse {
        id: e.id,
        user_id: e.user_id,
        user_role: e.user_role,
        action: e.action,
        entity_type: e.entity_type,
        entity_id: e.entity_id,
        entity_name: e.entity_name,
        details: e.details,
        created_at: e.created_at.to_rfc3339(),
    }
}

fn entries_response(entries: Vec<log_entry::Model>) -> Json<Vec<LogEntryResponse>> {
    Json(entries.into_iter().map(entry_response).collect())
}

/// `GET /Logger`
async fn list_entries(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<LogEntryResponse>>, AppError> {
    Ok(entries_response(LogService::list(&state.db).await?))
}

/// `GET /Logger/user/{user_id}`
async fn list_user_entries(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<LogEntryResponse>>, AppError> {
    Ok(entries_response(
        LogService::list_by_user(&state.db, user_id).await?,
    ))
}

/// `GET /Logger/entity/{entity_type}`
async fn list_entity_entries(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(entity_type): Path<String>,
) -> Result<Json<Vec<LogEntryResponse>>, AppError> {
    Ok(entries_response(
        LogService::list_by_entity_type(&state.db, &entity_type).await?,
    ))
}
