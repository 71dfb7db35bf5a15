//! Mutations must succeed even when the audit store rejects every write.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use etm_api::entities::Role;

use common::{delete, failing_audit_state, get, post_json, put_json, seed_user, token_for};

#[tokio::test]
async fn event_crud_survives_audit_failure() {
    let state = failing_audit_state().await;
    let app = common::app(&state);
    let player = seed_user(&state, "organiser", Role::Player).await;
    let token = token_for(&state, &player);

    let body = json!({
        "title": "Blackout Cup",
        "location": "Helsinki",
        "date": "2027-01-20T15:00:00Z",
        "description": "No audit today",
        "status": "upcoming",
    });

    let (status, event) = post_json(&app, "/Event", Some(&token), &body).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {event}");

    let mut updated = body.clone();
    updated["status"] = json!("cancelled");
    let (status, event) = put_json(&app, &format!("/Event/{}", event["id"]), Some(&token), &updated).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["status"], "cancelled");

    let (status, _) = delete(&app, &format!("/Event/{}", event["id"]), Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(common::audit_count(&state).await, 0);
}

#[tokio::test]
async fn team_crud_survives_audit_failure() {
    let state = failing_audit_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let admin = seed_user(&state, "root", Role::Admin).await;
    let token = token_for(&state, &manager);

    let (status, team) = post_json(
        &app,
        "/Team",
        Some(&token),
        &json!({ "description": "Quiet Ones", "managerId": manager.id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {team}");
    assert_eq!(team["points"], 0);

    let (status, team) = put_json(
        &app,
        &format!("/Team/{}", team["id"]),
        Some(&token),
        &json!({ "description": "Quiet Ones", "points": 3, "managerId": manager.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["points"], 3);

    let (status, _) = delete(
        &app,
        &format!("/Team/{}", team["id"]),
        Some(&token_for(&state, &admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn event_team_links_survive_audit_failure() {
    let state = failing_audit_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let token = token_for(&state, &manager);
    let team = common::seed_team(&state, &manager, "Quiet Ones", manager.id).await;
    let first = common::seed_event(&state, &manager, "First Night").await;
    let second = common::seed_event(&state, &manager, "Second Night").await;

    let (status, link) = post_json(
        &app,
        "/EventTeam",
        Some(&token),
        &json!({ "eventId": first.id, "teamId": team.id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, link) = put_json(
        &app,
        &format!("/EventTeam/{}", link["id"]),
        Some(&token),
        &json!({ "eventId": second.id, "teamId": team.id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(link["event"]["title"], "Second Night");

    let (status, _) = delete(&app, &format!("/EventTeam/{}", link["id"]), Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/EventTeam/{}", link["id"]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_reports_failure_without_erroring() {
    let state = failing_audit_state().await;
    let player = seed_user(&state, "organiser", Role::Player).await;

    let stored = etm_api::audit::record(
        state.audit.as_ref(),
        etm_api::audit::NewLogEntry::new(
            &common::actor(&player),
            etm_api::audit::AuditAction::Create,
            etm_api::audit::AuditEntity::Event,
            1,
            "Anything",
            "Dropped on the floor",
        ),
    )
    .await;

    assert!(!stored);
}
