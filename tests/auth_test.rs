mod common;

use axum::http::StatusCode;
use serde_json::json;

use etm_api::auth::jwt;
use etm_api::entities::Role;

use common::{PASSWORD, post_json, seed_user, test_state};

#[tokio::test]
async fn login_returns_token_with_role_claim() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;

    let (status, body) = post_json(
        &app,
        "/Auth/login",
        None,
        &json!({ "email": "coach@etm.test", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["userId"], manager.id);
    assert_eq!(body["username"], "coach");
    assert_eq!(body["role"], "manager");
    assert!(body["expiration"].is_string());

    let token = body["token"].as_str().unwrap_or_default();
    let (sub, role) = jwt::validate_token(token, &state.config)
        .map(|claims| (claims.sub, claims.role))
        .unwrap_or_default();
    assert_eq!(sub, manager.id.to_string());
    assert_eq!(role, "manager");
}

#[tokio::test]
async fn login_ignores_email_case() {
    let state = test_state().await;
    let app = common::app(&state);
    seed_user(&state, "caps", Role::Player).await;

    let (status, _) = post_json(
        &app,
        "/Auth/login",
        None,
        &json!({ "email": "CAPS@ETM.TEST", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_wrong_password_returns_401() {
    let state = test_state().await;
    let app = common::app(&state);
    seed_user(&state, "coach", Role::Manager).await;

    let (status, body) = post_json(
        &app,
        "/Auth/login",
        None,
        &json!({ "email": "coach@etm.test", "password": "WrongPass123!" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn login_unknown_email_returns_401() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, body) = post_json(
        &app,
        "/Auth/login",
        None,
        &json!({ "email": "nobody@etm.test", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");
}

#[tokio::test]
async fn login_malformed_json_returns_400() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, body) = post_json(&app, "/Auth/login", None, &json!({ "email": 42 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn register_defaults_to_player() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, body) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "newcomer",
            "email": "newcomer@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "2001-02-03",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    assert_eq!(body["role"], "player");
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn register_rejects_manager_role() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, body) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "coach",
            "email": "coach@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "1990-07-01",
            "role": "Manager",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Only player accounts can be self-registered.");

    // Nothing was created
    let (status, _) = post_json(
        &app,
        "/Auth/login",
        None,
        &json!({ "email": "coach@etm.test", "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_accepts_explicit_player_role() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, body) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "rookie",
            "email": "rookie@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "2002-04-09",
            "role": "player",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "player");
}

#[tokio::test]
async fn register_rejects_admin_role() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, _) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "sneaky",
            "email": "sneaky@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "1990-07-01",
            "role": "admin",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn register_duplicate_email_returns_409() {
    let state = test_state().await;
    let app = common::app(&state);
    seed_user(&state, "taken", Role::Player).await;

    let (status, body) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "another",
            "email": "Taken@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "1995-01-01",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered.");
}

#[tokio::test]
async fn register_duplicate_username_returns_409() {
    let state = test_state().await;
    let app = common::app(&state);
    seed_user(&state, "taken", Role::Player).await;

    let (status, body) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "TAKEN",
            "email": "fresh@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "1995-01-01",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Username already taken.");
}

#[tokio::test]
async fn register_rejects_future_date_of_birth() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, _) = post_json(
        &app,
        "/Auth/register",
        None,
        &json!({
            "username": "timetraveller",
            "email": "tt@etm.test",
            "password": PASSWORD,
            "dateOfBirth": "2999-01-01",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let state = test_state().await;
    let app = common::app(&state);
    let player = seed_user(&state, "forgetful", Role::Player).await;
    let token = common::token_for(&state, &player);

    let (status, _) = post_json(
        &app,
        "/Auth/change-password",
        Some(&token),
        &json!({ "currentPassword": "NotIt123!", "newPassword": "Brandnew456!" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post_json(
        &app,
        "/Auth/change-password",
        Some(&token),
        &json!({ "currentPassword": PASSWORD, "newPassword": "Brandnew456!" }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = post_json(
        &app,
        "/Auth/login",
        None,
        &json!({ "email": "forgetful@etm.test", "password": "Brandnew456!" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn change_password_requires_authentication() {
    let state = test_state().await;
    let app = common::app(&state);

    let (status, _) = post_json(
        &app,
        "/Auth/change-password",
        None,
        &json!({ "currentPassword": PASSWORD, "newPassword": "Brandnew456!" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
