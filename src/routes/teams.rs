use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{EventSummary, event_summary};
use super::{JsonBody, require_text};
use crate::auth::middleware::{AdminUser, ManagerUser};
use crate::entities::team;
use crate::error::AppError;
use crate::services::{NewTeam, TeamService};
use crate::state::AppState;

const ALLOWED_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Request body cap for uploads: the image plus room for multipart framing.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the team route group: `/Team/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_teams).post(create_team))
        .route("/{id}", get(get_team).put(update_team).delete(delete_team))
        .route(
            "/{id}/image",
            post(upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamResponse {
    id: i32,
    description: String,
    points: i32,
    image: Option<String>,
    manager_id: i32,
    created_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamDetailResponse {
    #[serde(flatten)]
    team: TeamResponse,
    players: Vec<PlayerSummary>,
    events: Vec<EventSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerSummary {
    id: i32,
    username: String,
    profile_image: Option<String>,
}

/// Compact team view embedded in other resources.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub id: i32,
    pub description: String,
    pub points: i32,
    pub image: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRequest {
    description: String,
    #[serde(default)]
    points: i32,
    image: Option<String>,
    manager_id: i32,
}

#[derive(Serialize)]
struct ImageResponse {
    image: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn team_response(t: team::Model) -> TeamResponse {
    TeamResponse {
        id: t.id,
        description: t.description,
        points: t.points,
        image: t.image,
        manager_id: t.manager_id,
        created_at: t.created_at.to_rfc3339(),
    }
}

pub fn team_summary(t: team::Model) -> TeamSummary {
    TeamSummary {
        id: t.id,
        description: t.description,
        points: t.points,
        image: t.image,
    }
}

fn validate_team(req: &TeamRequest) -> Result<(), AppError> {
    require_text(&req.description, "Description")?;
    if req.description.chars().count() > 200 {
        return Err(AppError::BadRequest(
            "Description must be at most 200 characters.".to_string(),
        ));
    }
    if req.points < 0 {
        return Err(AppError::BadRequest(
            "Points cannot be negative.".to_string(),
        ));
    }
    Ok(())
}

fn too_large() -> AppError {
    AppError::BadRequest("File exceeds the 5 MB size limit.".to_string())
}

/// Bodies cut off by the upload limit report the size cap rather than a parse failure.
fn multipart_error(err: &MultipartError, context: &str) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large()
    } else {
        AppError::BadRequest(format!("{context}: {err}"))
    }
}

impl From<TeamRequest> for NewTeam {
    fn from(req: TeamRequest) -> Self {
        Self {
            description: req.description.trim().to_string(),
            points: req.points,
            image: req.image,
            manager_id: req.manager_id,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /Team`
async fn list_teams(State(state): State<AppState>) -> Result<Json<Vec<TeamResponse>>, AppError> {
    let teams = TeamService::list(&state.db).await?;
    Ok(Json(teams.into_iter().map(team_response).collect()))
}

/// `GET /Team/{id}`
///
/// Includes players and linked events.
async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeamDetailResponse>, AppError> {
    let team_model = TeamService::get(&state.db, id).await?;
    let players = TeamService::players(&state.db, &team_model).await?;
    let events = TeamService::events(&state.db, &team_model).await?;

    Ok(Json(TeamDetailResponse {
        team: team_response(team_model),
        players: players
            .into_iter()
            .map(|p| PlayerSummary {
                id: p.id,
                username: p.username,
                profile_image: p.profile_image,
            })
            .collect(),
        events: events.into_iter().map(event_summary).collect(),
    }))
}

/// `POST /Team`
async fn create_team(
    State(state): State<AppState>,
    manager: ManagerUser,
    JsonBody(body): JsonBody<TeamRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_team(&body)?;

    let created =
        TeamService::create(&state.db, state.audit.as_ref(), &manager.actor(), body.into())
            .await?;

    Ok((StatusCode::CREATED, Json(team_response(created))))
}

/// `PUT /Team/{id}`
async fn update_team(
    State(state): State<AppState>,
    manager: ManagerUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<TeamRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    validate_team(&body)?;

    let updated = TeamService::update(
        &state.db,
        state.audit.as_ref(),
        &manager.actor(),
        id,
        body.into(),
    )
    .await?;

    Ok(Json(team_response(updated)))
}

/// `DELETE /Team/{id}`
async fn delete_team(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    TeamService::delete(&state.db, state.audit.as_ref(), &admin.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /Team/{id}/image`
///
/// Multipart upload of the team image.
async fn upload_image(
    State(state): State<AppState>,
    manager: ManagerUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> Result<Json<ImageResponse>, AppError> {
    // Fail before touching the disk when the team does not exist
    TeamService::get(&state.db, id).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, "Invalid multipart data"))?
        .ok_or_else(|| AppError::BadRequest("No file field provided.".to_string()))?;

    let file_name = field.file_name().unwrap_or("upload.bin").to_string();
    let extension = file_name.rsplit('.').next().unwrap_or("").to_lowercase();

    if !ALLOWED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::BadRequest(
            "Unsupported file type. Allowed: PNG, JPG, GIF, WEBP.".to_string(),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| multipart_error(&e, "Failed to read file data"))?;

    if data.len() > MAX_IMAGE_BYTES {
        return Err(too_large());
    }

    let upload_dir = std::path::Path::new(&state.config.upload_dir).join("teams");
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create upload dir: {e}")))?;

    let stored_name = format!("{}.{extension}", Uuid::new_v4());
    tokio::fs::write(upload_dir.join(&stored_name), &data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to write file: {e}")))?;

    let image = format!("teams/{stored_name}");
    TeamService::set_image(
        &state.db,
        state.audit.as_ref(),
        &manager.actor(),
        id,
        image.clone(),
    )
    .await?;

    Ok(Json(ImageResponse { image }))
}
