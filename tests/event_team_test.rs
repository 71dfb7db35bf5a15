mod common;

use axum::http::StatusCode;
use serde_json::json;

use etm_api::entities::Role;
use etm_api::error::AppError;
use etm_api::services::{ALREADY_LINKED, EventTeamService, LogService};

use common::{actor, delete, get, post_json, put_json, seed_event, seed_team, seed_user, test_state, token_for};

#[tokio::test]
async fn end_to_end_link_lifecycle() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let token = token_for(&state, &manager);
    let team = seed_team(&state, &manager, "Night Owls", manager.id).await;

    let (status, event) = post_json(
        &app,
        "/Event",
        Some(&token),
        &json!({
            "title": "Autumn Clash",
            "location": "Oslo",
            "date": "2027-10-01T12:00:00Z",
            "description": "Regional final",
            "status": "upcoming",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "event create failed: {event}");
    let event_id = event["id"].as_i64().unwrap_or_default();
    assert!(event_id > 0);

    let link_body = json!({ "eventId": event_id, "teamId": team.id });

    let (status, link) = post_json(&app, "/EventTeam", Some(&token), &link_body).await;
    assert_eq!(status, StatusCode::CREATED, "link create failed: {link}");
    assert_eq!(link["eventId"], event_id);
    assert_eq!(link["teamId"], team.id);
    assert_eq!(link["event"]["title"], "Autumn Clash");
    assert_eq!(link["team"]["description"], "Night Owls");
    let link_id = link["id"].as_i64().unwrap_or_default();

    let (status, body) = post_json(&app, "/EventTeam", Some(&token), &link_body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], ALREADY_LINKED);

    let (status, _) = delete(&app, &format!("/EventTeam/{link_id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &format!("/EventTeam/{link_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn players_cannot_link_teams() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let player = seed_user(&state, "player1", Role::Player).await;
    let team = seed_team(&state, &manager, "Night Owls", manager.id).await;
    let event = seed_event(&state, &manager, "Autumn Clash").await;

    let (status, _) = post_json(
        &app,
        "/EventTeam",
        Some(&token_for(&state, &player)),
        &json!({ "eventId": event.id, "teamId": team.id }),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_with_missing_parent_writes_nothing() {
    let state = test_state().await;
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let team = seed_team(&state, &manager, "Night Owls", manager.id).await;
    let event = seed_event(&state, &manager, "Autumn Clash").await;
    let by = actor(&manager);

    let missing_event =
        EventTeamService::create(&state.db, state.audit.as_ref(), &by, 999, team.id).await;
    assert!(matches!(missing_event, Err(AppError::NotFound(ref m)) if m == "Event not found."));

    let missing_team =
        EventTeamService::create(&state.db, state.audit.as_ref(), &by, event.id, 999).await;
    assert!(matches!(missing_team, Err(AppError::NotFound(ref m)) if m == "Team not found."));

    let links = EventTeamService::list(&state.db).await.unwrap_or_default();
    assert!(links.is_empty());
}

#[tokio::test]
async fn update_to_own_pair_is_not_a_duplicate() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let token = token_for(&state, &manager);
    let team = seed_team(&state, &manager, "Night Owls", manager.id).await;
    let event = seed_event(&state, &manager, "Autumn Clash").await;
    let body = json!({ "eventId": event.id, "teamId": team.id });

    let (_, link) = post_json(&app, "/EventTeam", Some(&token), &body).await;
    let link_id = link["id"].as_i64().unwrap_or_default();

    let (status, updated) = put_json(&app, &format!("/EventTeam/{link_id}"), Some(&token), &body).await;

    assert_eq!(status, StatusCode::OK, "self update failed: {updated}");
    assert_eq!(updated["id"], link_id);
}

#[tokio::test]
async fn update_onto_existing_pair_conflicts() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let token = token_for(&state, &manager);
    let owls = seed_team(&state, &manager, "Night Owls", manager.id).await;
    let larks = seed_team(&state, &manager, "Morning Larks", manager.id).await;
    let event = seed_event(&state, &manager, "Autumn Clash").await;

    post_json(
        &app,
        "/EventTeam",
        Some(&token),
        &json!({ "eventId": event.id, "teamId": owls.id }),
    )
    .await;
    let (_, larks_link) = post_json(
        &app,
        "/EventTeam",
        Some(&token),
        &json!({ "eventId": event.id, "teamId": larks.id }),
    )
    .await;

    let (status, body) = put_json(
        &app,
        &format!("/EventTeam/{}", larks_link["id"]),
        Some(&token),
        &json!({ "eventId": event.id, "teamId": owls.id }),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], ALREADY_LINKED);
}

#[tokio::test]
async fn update_with_missing_team_returns_404() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let token = token_for(&state, &manager);
    let team = seed_team(&state, &manager, "Night Owls", manager.id).await;
    let event = seed_event(&state, &manager, "Autumn Clash").await;

    let (_, link) = post_json(
        &app,
        "/EventTeam",
        Some(&token),
        &json!({ "eventId": event.id, "teamId": team.id }),
    )
    .await;

    let (status, _) = put_json(
        &app,
        &format!("/EventTeam/{}", link["id"]),
        Some(&token),
        &json!({ "eventId": event.id, "teamId": 777 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Unchanged
    let (_, stored) = get(&app, &format!("/EventTeam/{}", link["id"]), None).await;
    assert_eq!(stored["teamId"], team.id);
}

#[tokio::test]
async fn delete_missing_link_returns_404() {
    let state = test_state().await;
    let app = common::app(&state);
    let manager = seed_user(&state, "coach", Role::Manager).await;

    let (status, _) = delete(&app, "/EventTeam/31337", Some(&token_for(&state, &manager))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_detail_orders_teams_by_points() {
    let state = test_state().await;
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let by = actor(&manager);
    let event = seed_event(&state, &manager, "Autumn Clash").await;

    for description in ["Low", "High"] {
        let team = seed_team(&state, &manager, description, manager.id).await;
        let points = if description == "High" { 90 } else { 5 };
        etm_api::services::TeamService::update(
            &state.db,
            state.audit.as_ref(),
            &by,
            team.id,
            etm_api::services::NewTeam {
                description: description.to_string(),
                points,
                image: None,
                manager_id: manager.id,
            },
        )
        .await
        .map(|_| ())
        .unwrap_or_default();
        EventTeamService::create(&state.db, state.audit.as_ref(), &by, event.id, team.id)
            .await
            .map(|_| ())
            .unwrap_or_default();
    }

    let app = common::app(&state);
    let (status, body) = get(&app, &format!("/Event/{}", event.id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teams"][0]["description"], "High");
    assert_eq!(body["teams"][1]["description"], "Low");
}

#[tokio::test]
async fn repeated_delete_is_audited_once() {
    let state = test_state().await;
    let manager = seed_user(&state, "coach", Role::Manager).await;
    let team = seed_team(&state, &manager, "Night Owls", manager.id).await;
    let event = seed_event(&state, &manager, "Autumn Clash").await;
    let by = actor(&manager);

    let created = EventTeamService::create(&state.db, state.audit.as_ref(), &by, event.id, team.id)
        .await
        .expect("create link");
    let link_id = created.link.id;

    let first = EventTeamService::delete(&state.db, state.audit.as_ref(), &by, link_id).await;
    assert!(matches!(first, Ok(true)));
    let after_first = LogService::list_by_entity_type(&state.db, "EventTeam")
        .await
        .unwrap_or_default();
    assert_eq!(after_first.len(), 2);
    assert_eq!(after_first[0].entity_id, link_id);

    let second = EventTeamService::delete(&state.db, state.audit.as_ref(), &by, link_id).await;
    assert!(matches!(second, Ok(false)));
    let after_second = LogService::list_by_entity_type(&state.db, "EventTeam")
        .await
        .unwrap_or_default();
    assert_eq!(after_second.len(), 2);
}
