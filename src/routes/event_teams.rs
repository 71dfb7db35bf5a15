use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use super::events::{EventSummary, event_summary};
use super::teams::{TeamSummary, team_summary};
use crate::auth::middleware::ManagerUser;
use crate::error::AppError;
use crate::services::{EventTeamDetails, EventTeamService};
use crate::state::AppState;

/// Build the link route group: `/EventTeam/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_links).post(create_link))
        .route("/{id}", get(get_link).put(update_link).delete(delete_link))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventTeamResponse {
    id: i32,
    event_id: i32,
    team_id: i32,
    event: EventSummary,
    team: TeamSummary,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTeamRequest {
    event_id: i32,
    team_id: i32,
}

fn link_response(details: EventTeamDetails) -> EventTeamResponse {
    EventTeamResponse {
        id: details.link.id,
        event_id: details.link.event_id,
        team_id: details.link.team_id,
        event: event_summary(details.event),
        team: team_summary(details.team),
    }
}

/// `GET /EventTeam`
async fn list_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventTeamResponse>>, AppError> {
    let links = EventTeamService::list(&state.db).await?;
    Ok(Json(links.into_iter().map(link_response).collect()))
}

/// `GET /EventTeam/{id}`
async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventTeamResponse>, AppError> {
    let details = EventTeamService::get(&state.db, id).await?;
    Ok(Json(link_response(details)))
}

/// `POST /EventTeam`
async fn create_link(
    State(state): State<AppState>,
    manager: ManagerUser,
    JsonBody(body): JsonBody<EventTeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let details = EventTeamService::create(
        &state.db,
        state.audit.as_ref(),
        &manager.actor(),
        body.event_id,
        body.team_id,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(link_response(details))))
}

/// `PUT /EventTeam/{id}`
async fn update_link(
    State(state): State<AppState>,
    manager: ManagerUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<EventTeamRequest>,
) -> Result<Json<EventTeamResponse>, AppError> {
    let details = EventTeamService::update(
        &state.db,
        state.audit.as_ref(),
        &manager.actor(),
        id,
        body.event_id,
        body.team_id,
    )
    .await?;

    Ok(Json(link_response(details)))
}

/// `DELETE /EventTeam/{id}`
async fn delete_link(
    State(state): State<AppState>,
    manager: ManagerUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if EventTeamService::delete(&state.db, state.audit.as_ref(), &manager.actor(), id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Event team link not found.".to_string()))
    }
}
