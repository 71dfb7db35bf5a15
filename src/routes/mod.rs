mod auth;
mod event_teams;
mod events;
mod favourites;
mod health;
mod logs;
mod teams;
mod users;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};

use crate::error::AppError;
use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health`: health check with database connectivity
/// - `/Auth`: login, registration, password change
/// - `/User`, `/Team`, `/Event`: entity CRUD
/// - `/EventTeam`: event ↔ team links
/// - `/UserFavourite`: users' saved events
/// - `/Logger`: audit log (admin only)
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/Auth", auth::router())
        .nest("/User", users::router())
        .nest("/Team", teams::router())
        .nest("/Event", events::router())
        .nest("/EventTeam", event_teams::router())
        .nest("/UserFavourite", favourites::router())
        .nest("/Logger", logs::router())
}

/// JSON body extractor whose rejections are reported as 400 with the usual error body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

/// Reject blank required text fields.
fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required.")));
    }
    Ok(())
}
