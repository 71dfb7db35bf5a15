use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use super::users::{parse_date_of_birth, parse_role, validate_identity};
use crate::auth::middleware::AuthUser;
use crate::auth::{jwt, password};
use crate::entities::{Role, user};
use crate::error::AppError;
use crate::services::{NewUser, UserService};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/Auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/change-password", post(change_password))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    date_of_birth: String,
    role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expiration: String,
    pub user_id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
}

fn login_response(user_model: &user::Model, state: &AppState) -> Result<LoginResponse, AppError> {
    let issued = jwt::issue_token(user_model, &state.config)?;
    Ok(LoginResponse {
        token: issued.token,
        expiration: issued.expires_at.to_rfc3339(),
        user_id: user_model.id,
        username: user_model.username.clone(),
        email: user_model.email.clone(),
        role: user_model.role.clone(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /Auth/login`
async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user_model = UserService::authenticate(&state.db, &body.email, &body.password).await?;

    tracing::info!(user_id = user_model.id, role = %user_model.role, "User logged in");

    Ok(Json(login_response(&user_model, &state)?))
}

/// `POST /Auth/register`
///
/// Creates a player account and logs it in immediately.
async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_identity(&body.username, &body.email)?;
    password::validate_password(&body.password).map_err(AppError::BadRequest)?;
    let date_of_birth = parse_date_of_birth(&body.date_of_birth)?;

    // Elevated roles are granted by an admin through /User
    let role = body.role.as_deref().map(parse_role).transpose()?.unwrap_or_default();
    if role != Role::Player {
        return Err(AppError::BadRequest(
            "Only player accounts can be self-registered.".to_string(),
        ));
    }

    let password_text = body.password.clone();
    let created = UserService::create(
        &state.db,
        state.audit.as_ref(),
        None,
        NewUser {
            username: body.username,
            email: body.email,
            password: body.password,
            role,
            date_of_birth,
            profile_image: None,
            team_id: None,
        },
    )
    .await?;

    let user_model = UserService::authenticate(&state.db, &created.email, &password_text).await?;

    tracing::info!(user_id = user_model.id, role = %user_model.role, "User registered");

    Ok((StatusCode::CREATED, Json(login_response(&user_model, &state)?)))
}

/// `POST /Auth/change-password`
async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    password::validate_password(&body.new_password).map_err(AppError::BadRequest)?;

    UserService::change_password(
        &state.db,
        user_model.id,
        &body.current_password,
        &body.new_password,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
