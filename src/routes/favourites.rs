use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use crate::auth::middleware::AuthUser;
use crate::entities::user_favourite;
use crate::error::AppError;
use crate::services::FavouriteService;
use crate::state::AppState;

/// Build the favourites route group: `/UserFavourite/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favourites).post(create_favourite))
        .route(
            "/{id}",
            get(get_favourite)
                .put(update_favourite)
                .delete(delete_favourite),
        )
        .route("/user/{user_id}", get(list_user_favourites))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavouriteResponse {
    id: i32,
    user_id: i32,
    event_id: i32,
}

/// Both ids are optional so that a missing one is reported by the service as a 400.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFavouriteRequest {
    user_id: Option<i32>,
    event_id: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateFavouriteRequest {
    user_id: i32,
    event_id: i32,
}

fn favourite_response(f: user_favourite::Model) -> FavouriteResponse {
    FavouriteResponse {
        id: f.id,
        user_id: f.user_id,
        event_id: f.event_id,
    }
}

/// `GET /UserFavourite`
async fn list_favourites(
    State(state): State<AppState>,
) -> Result<Json<Vec<FavouriteResponse>>, AppError> {
    let favourites = FavouriteService::list(&state.db).await?;
    Ok(Json(favourites.into_iter().map(favourite_response).collect()))
}

/// `GET /UserFavourite/user/{user_id}`
async fn list_user_favourites(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Vec<FavouriteResponse>>, AppError> {
    let favourites = FavouriteService::list_for_user(&state.db, user_id).await?;
    Ok(Json(favourites.into_iter().map(favourite_response).collect()))
}

/// `GET /UserFavourite/{id}`
async fn get_favourite(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FavouriteResponse>, AppError> {
    let favourite = FavouriteService::get(&state.db, id).await?;
    Ok(Json(favourite_response(favourite)))
}

/// `POST /UserFavourite`
async fn create_favourite(
    State(state): State<AppState>,
    _auth: AuthUser,
    JsonBody(body): JsonBody<CreateFavouriteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = FavouriteService::create(&state.db, body.user_id, body.event_id).await?;
    Ok((StatusCode::CREATED, Json(favourite_response(created))))
}

/// `PUT /UserFavourite/{id}`
async fn update_favourite(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i32>,
    JsonBody(body): JsonBody<UpdateFavouriteRequest>,
) -> Result<Json<FavouriteResponse>, AppError> {
    let updated = FavouriteService::update(&state.db, id, body.user_id, body.event_id).await?;
    Ok(Json(favourite_response(updated)))
}

/// `DELETE /UserFavourite/{id}`
async fn delete_favourite(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    if FavouriteService::delete(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Favourite not found.".to_string()))
    }
}
