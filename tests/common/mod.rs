#![allow(dead_code, clippy::expect_used)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::{Duration, NaiveDate, Utc};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use serde_json::Value;
use tower::ServiceExt;

use etm_api::audit::{Actor, AuditSink, DbAuditSink, NewLogEntry};
use etm_api::auth::jwt;
use etm_api::config::{Config, Environment};
use etm_api::entities::{Role, event, log_entry, team, user};
use etm_api::services::{
    EventService, NewEvent, NewTeam, NewUser, TeamService, UserService,
};
use etm_api::state::AppState;

pub const PASSWORD: &str = "Password123!";

pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
        jwt_issuer: "etm-api".to_string(),
        jwt_audience: "etm-frontend".to_string(),
        jwt_expiration_secs: 900,
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        upload_dir: std::env::temp_dir()
            .join("etm_test_uploads")
            .to_string_lossy()
            .into_owned(),
        bootstrap_admin: None,
    }
}

/// Audit sink that always fails, for checking that audit writes never block mutations.
#[derive(Debug)]
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn append(&self, _entry: NewLogEntry) -> anyhow::Result<log_entry::Model> {
        Err(anyhow::anyhow!("audit store unavailable"))
    }
}

/// State backed by an in-memory `SQLite` database with migrations applied.
pub async fn test_state() -> AppState {
    let db = sea_orm::Database::connect("sqlite::memory:")
        .await
        .expect("connect sqlite");
    Migrator::up(&db, None).await.expect("migrations");

    AppState {
        audit: Arc::new(DbAuditSink::new(db.clone())),
        db,
        config: test_config(),
    }
}

/// Same as [`test_state`] but every audit write fails.
pub async fn failing_audit_state() -> AppState {
    let state = test_state().await;
    AppState {
        audit: Arc::new(FailingAuditSink),
        ..state
    }
}

pub fn app(state: &AppState) -> Router {
    etm_api::routes::router().with_state(state.clone())
}

pub fn actor(u: &user::Model) -> Actor {
    Actor::from(u)
}

/// Insert a user directly through the service; the password is [`PASSWORD`].
pub async fn seed_user(state: &AppState, username: &str, role: Role) -> user::Model {
    UserService::create(
        &state.db,
        state.audit.as_ref(),
        None,
        NewUser {
            username: username.to_string(),
            email: format!("{username}@etm.test"),
            password: PASSWORD.to_string(),
            role,
            date_of_birth: NaiveDate::from_ymd_opt(1999, 5, 17).expect("valid date"),
            profile_image: None,
            team_id: None,
        },
    )
    .await
    .expect("seed user")
}

pub async fn seed_team(state: &AppState, by: &user::Model, description: &str, manager_id: i32) -> team::Model {
    TeamService::create(
        &state.db,
        state.audit.as_ref(),
        &actor(by),
        NewTeam {
            description: description.to_string(),
            points: 0,
            image: None,
            manager_id,
        },
    )
    .await
    .expect("seed team")
}

pub fn new_event(title: &str) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        location: "Copenhagen".to_string(),
        date: (Utc::now() + Duration::days(30)).fixed_offset(),
        description: format!("{title} description"),
        detail: "Bracket, schedule and rules.".to_string(),
        status: etm_api::entities::EventStatus::Upcoming,
        image: None,
    }
}

pub async fn seed_event(state: &AppState, by: &user::Model, title: &str) -> event::Model {
    EventService::create(&state.db, state.audit.as_ref(), &actor(by), new_event(title))
        .await
        .expect("seed event")
}

pub fn token_for(state: &AppState, u: &user::Model) -> String {
    jwt::issue_token(u, &state.config).expect("issue token").token
}

/// Send a request and return (status, parsed JSON body or `Null`).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, Value) {
    send(app, Method::PUT, uri, token, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, token, None).await
}

/// Number of audit rows currently stored.
pub async fn audit_count(state: &AppState) -> usize {
    etm_api::services::LogService::list(&state.db)
        .await
        .map(|entries| entries.len())
        .unwrap_or_default()
}
