use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use crate::auth::middleware::AuthUser;
use crate::auth::password;
use crate::entities::{Role, user};
use crate::error::AppError;
use crate::services::{NewUser, UserChanges, UserService};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the user route group: `/User/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
    pub date_of_birth: String,
    pub profile_image: Option<String>,
    pub team_id: Option<i32>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    username: String,
    email: String,
    password: String,
    role: Option<String>,
    date_of_birth: String,
    profile_image: Option<String>,
    team_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserRequest {
    username: String,
    email: String,
    role: String,
    date_of_birth: String,
    profile_image: Option<String>,
    team_id: Option<i32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

pub fn user_response(u: user::Model) -> UserResponse {
    UserResponse {
        id: u.id,
        username: u.username,
        email: u.email,
        role: u.role,
        date_of_birth: u.date_of_birth.format("%Y-%m-%d").to_string(),
        profile_image: u.profile_image,
        team_id: u.team_id,
        created_at: u.created_at.to_rfc3339(),
        last_login_at: u.last_login_at.map(|t| t.to_rfc3339()),
    }
}

/// Validate username and email shape.
pub fn validate_identity(username: &str, email: &str) -> Result<(), AppError> {
    password::validate_username(username.trim()).map_err(AppError::BadRequest)?;
    password::validate_email(email).map_err(AppError::BadRequest)?;
    Ok(())
}

/// Parse a `YYYY-MM-DD` date of birth that lies in the past.
pub fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, AppError> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::BadRequest("Date of birth must be formatted as YYYY-MM-DD.".to_string())
    })?;
    if date >= Utc::now().date_naive() {
        return Err(AppError::BadRequest(
            "Date of birth must be in the past.".to_string(),
        ));
    }
    Ok(date)
}

pub fn parse_role(raw: &str) -> Result<Role, AppError> {
    Role::from_str(raw).ok_or_else(|| {
        AppError::BadRequest("Role must be one of admin, manager, player.".to_string())
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /User`
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = UserService::list(&state.db).await?;
    Ok(Json(users.into_iter().map(user_response).collect()))
}

/// `GET /User/{id}`
async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    let user_model = UserService::get(&state.db, id).await?;
    Ok(Json(user_response(user_model)))
}

/// `POST /User`
///
/// Only admins may create accounts with a role other than player.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_identity(&body.username, &body.email)?;
    password::validate_password(&body.password).map_err(AppError::BadRequest)?;
    let date_of_birth = parse_date_of_birth(&body.date_of_birth)?;
    let role = body.role.as_deref().map(parse_role).transpose()?.unwrap_or_default();

    if role != Role::Player && auth.0.role() != Role::Admin {
        return Err(AppError::Forbidden(
            "Only admins can assign elevated roles.".to_string(),
        ));
    }

    let created = UserService::create(
        &state.db,
        state.audit.as_ref(),
        Some(&auth.actor()),
        NewUser {
            username: body.username,
            email: body.email,
            password: body.password,
            role,
            date_of_birth,
            profile_image: body.profile_image,
            team_id: body.team_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user_response(created))))
}

/// `PUT /User/{id}`
///
/// Users may edit their own profile; editing others or changing a role requires admin.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    validate_identity(&body.username, &body.email)?;
    let date_of_birth = parse_date_of_birth(&body.date_of_birth)?;
    let role = parse_role(&body.role)?;

    let existing = UserService::get(&state.db, id).await?;
    let is_admin = auth.0.role() == Role::Admin;
    if !is_admin && auth.0.id != id {
        return Err(AppError::Forbidden(
            "You can only edit your own profile.".to_string(),
        ));
    }
    if !is_admin && role != existing.role() {
        return Err(AppError::Forbidden(
            "Only admins can change roles.".to_string(),
        ));
    }

    let updated = UserService::update(
        &state.db,
        state.audit.as_ref(),
        &auth.actor(),
        id,
        UserChanges {
            username: body.username,
            email: body.email,
            role,
            date_of_birth,
            profile_image: body.profile_image,
            team_id: body.team_id,
        },
    )
    .await?;

    Ok(Json(user_response(updated)))
}

/// `DELETE /User/{id}`
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if auth.0.role() != Role::Admin && auth.0.id != id {
        return Err(AppError::Forbidden(
            "You can only delete your own account.".to_string(),
        ));
    }

    UserService::delete(&state.db, state.audit.as_ref(), &auth.actor(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
