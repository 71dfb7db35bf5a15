use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::teams::{TeamSummary, team_summary};
use super::{JsonBody, require_text};
use crate::auth::middleware::AuthUser;
use crate::entities::{EventStatus, event};
use crate::error::AppError;
use crate::services::{EventService, NewEvent};
use crate::state::AppState;

/// Build the event route group: `/Event/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event).put(update_event).delete(delete_event))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventResponse {
    id: i32,
    title: String,
    location: String,
    date: String,
    description: String,
    detail: String,
    status: String,
    image: Option<String>,
    created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDetailResponse {
    #[serde(flatten)]
    event: EventResponse,
    teams: Vec<TeamSummary>,
}

/// Compact event view embedded in other resources.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: i32,
    pub title: String,
    pub location: String,
    pub date: String,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventRequest {
    title: String,
    location: String,
    /// RFC 3339 timestamp.
    date: String,
    description: String,
    #[serde(default)]
    detail: String,
    status: String,
    image: Option<String>,
}

fn event_response(e: event::Model) -> EventResponse {
    EventResponse {
        id: e.id,
        title: e.title,
        location: e.location,
        date: e.date.to_rfc3339(),
        description: e.description,
        detail: e.detail,
        status: e.status,
        image: e.image,
        created_at: e.created_at.to_rfc3339(),
    }
}

pub fn event_summary(e: event::Model) -> EventSummary {
    EventSummary {
        id: e.id,
        title: e.title,
        location: e.location,
        date: e.date.to_rfc3339(),
        status: e.status,
    }
}

impl TryFrom<EventRequest> for NewEvent {
    type Error = AppError;

    fn try_from(req: EventRequest) -> Result<Self, Self::Error> {
        require_text(&req.title, "Title")?;
        require_text(&req.location, "Location")?;
        require_text(&req.description, "Description")?;
        if req.title.chars().count() > 200 {
            return Err(AppError::BadRequest(
                "Title must be at most 200 characters.".to_string(),
            ));
        }

        let date = DateTime::parse_from_rfc3339(req.date.trim()).map_err(|_| {
            AppError::BadRequest("Date must be an RFC 3339 timestamp.".to_string())
        })?;
        let status = EventStatus::from_str(&req.status).ok_or_else(|| {
            AppError::BadRequest(
                "Status must be one of live, upcoming, ended, cancelled.".to_string(),
            )
        })?;

        Ok(Self {
            title: req.title.trim().to_string(),
            location: req.location.trim().to_string(),
            date,
            description: req.description,
            detail: req.detail,
            status,
            image: req.image,
        })
    }
}

/// `GET /Event`
async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = EventService::list(&state.db).await?;
    Ok(Json(events.into_iter().map(event_response).collect()))
}

/// `GET /Event/{id}`
///
/// Includes the linked teams.
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventDetailResponse>, AppError> {
    let event_model = EventService::get(&state.db, id).await?;
    let teams = EventService::teams(&state.db, &event_model).await?;

    Ok(Json(EventDetailResponse {
        event: event_response(event_model),
        teams: teams.into_iter().map(team_summary).collect(),
    }))
}

/// `POST /Event`
async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new_event = NewEvent::try_from(body)?;
    let created =
        EventService::create(&state.db, state.audit.as_ref(), &auth.actor(), new_event).await?;

    Ok((StatusCode::CREATED, Json(event_response(created))))
}

/// `PUT /Event/{id}`
async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<EventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let changes = NewEvent::try_from(body)?;
    let updated =
        EventService::update(&state.db, state.audit.as_ref(), &auth.actor(), id, changes).await?;

    Ok(Json(event_response(updated)))
}

/// `DELETE /Event/{id}`
async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    EventService::delete(&state.db, state.audit.as_ref(), &auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
