mod common;

use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use etm_api::auth::jwt;
use etm_api::auth::middleware::{AdminUser, AuthUser, ManagerUser};
use etm_api::config::Config;
use etm_api::entities::Role;
use etm_api::state::AppState;

use common::{seed_user, test_state, token_for};

async fn test_app_with_middleware_routes() -> (Router, AppState) {
    let state = test_state().await;

    // Routes that only exercise the extractors
    let app = Router::new()
        .route(
            "/test/user",
            get(|AuthUser(u): AuthUser| async move { Json(json!({ "id": u.id, "role": u.role })) }),
        )
        .route(
            "/test/manager",
            get(|ManagerUser(u): ManagerUser| async move {
                Json(json!({ "id": u.id, "role": u.role }))
            }),
        )
        .route(
            "/test/admin",
            get(|AdminUser(u): AdminUser| async move {
                Json(json!({ "id": u.id, "role": u.role }))
            }),
        )
        .with_state(state.clone());

    (app, state)
}

#[tokio::test]
async fn auth_user_rejects_missing_header() {
    let (app, _) = test_app_with_middleware_routes().await;
    let (status, body) = common::get(&app, "/test/user", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing authorization header.");
}

#[tokio::test]
async fn auth_user_rejects_garbage_token() {
    let (app, _) = test_app_with_middleware_routes().await;
    let (status, _) = common::get(&app, "/test/user", Some("not-a-jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_user_rejects_token_from_other_issuer() {
    let (app, state) = test_app_with_middleware_routes().await;
    let player = seed_user(&state, "drifter", Role::Player).await;

    let foreign = Config {
        jwt_issuer: "someone-else".to_string(),
        ..state.config.clone()
    };
    let token = jwt::issue_token(&player, &foreign)
        .map(|issued| issued.token)
        .unwrap_or_default();

    let (status, _) = common::get(&app, "/test/user", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_user_accepts_valid_token() {
    let (app, state) = test_app_with_middleware_routes().await;
    let player = seed_user(&state, "rookie", Role::Player).await;
    let token = token_for(&state, &player);

    let (status, body) = common::get(&app, "/test/user", Some(&token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], player.id);
    assert_eq!(body["role"], "player");
}

#[tokio::test]
async fn auth_user_rejects_deleted_account() {
    let (app, state) = test_app_with_middleware_routes().await;
    let player = seed_user(&state, "ghost", Role::Player).await;
    let token = token_for(&state, &player);

    etm_api::services::UserService::delete(
        &state.db,
        state.audit.as_ref(),
        &common::actor(&player),
        player.id,
    )
    .await
    .unwrap_or_default();

    let (status, _) = common::get(&app, "/test/user", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn manager_extractor_checks_role() {
    let (app, state) = test_app_with_middleware_routes().await;
    let player = seed_user(&state, "player1", Role::Player).await;
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let admin = seed_user(&state, "root", Role::Admin).await;

    let (status, _) = common::get(&app, "/test/manager", Some(&token_for(&state, &player))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::get(&app, "/test/manager", Some(&token_for(&state, &manager))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::get(&app, "/test/manager", Some(&token_for(&state, &admin))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_extractor_rejects_manager() {
    let (app, state) = test_app_with_middleware_routes().await;
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let admin = seed_user(&state, "root", Role::Admin).await;

    let (status, body) = common::get(&app, "/test/admin", Some(&token_for(&state, &manager))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin role required.");

    let (status, body) = common::get(&app, "/test/admin", Some(&token_for(&state, &admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}
