//! Event ↔ team links.
//!
//! Both sides must exist when a link is written and a pair may only be linked once. The
//! duplicate check gives a precise error; the unique index on `(event_id, team_id)` is what
//! actually guarantees it under concurrent requests.

use std::collections::HashMap;

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

use super::is_unique_violation;
use crate::audit::{self, Actor, AuditAction, AuditEntity, AuditSink, NewLogEntry};
use crate::entities::{event, event_team, team};
use crate::error::AppError;

/// Message returned when a pair is already linked.
pub const ALREADY_LINKED: &str = "Team is already linked to this event.";

/// A link with both of its parents loaded.
#[derive(Debug, Clone)]
pub struct EventTeamDetails {
    pub link: event_team::Model,
    pub event: event::Model,
    pub team: team::Model,
}

impl EventTeamDetails {
    fn display_name(&self) -> String {
        link_name(&self.event, &self.team)
    }
}

pub struct EventTeamService;

impl EventTeamService {
    /// All links in insertion order.
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<EventTeamDetails>, AppError> {
        let links = event_team::Entity::find()
            .order_by_asc(event_team::Column::Id)
            .all(db)
            .await?;
        resolve(db, links).await
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<EventTeamDetails, AppError> {
        let link = find_link(db, id).await?;
        let event = find_event(db, link.event_id).await?;
        let team = find_team(db, link.team_id).await?;
        Ok(EventTeamDetails { link, event, team })
    }

    pub async fn create(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        event_id: i32,
        team_id: i32,
    ) -> Result<EventTeamDetails, AppError> {
        let event = find_event(db, event_id).await?;
        let team = find_team(db, team_id).await?;

        if Self::pair_exists(db, event_id, team_id, None).await? {
            return Err(AppError::Conflict(ALREADY_LINKED.to_string()));
        }

        let link = event_team::ActiveModel {
            event_id: Set(event_id),
            team_id: Set(team_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(link_write_error)?;

        let details = EventTeamDetails { link, event, team };

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Create,
                AuditEntity::EventTeam,
                details.link.id,
                details.display_name(),
                format!(
                    "Team '{}' joined event '{}'",
                    details.team.description, details.event.title
                ),
            ),
        )
        .await;

        Ok(details)
    }

    /// Re-point an existing link. Keeping its own pair is not a duplicate.
    pub async fn update(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
        event_id: i32,
        team_id: i32,
    ) -> Result<EventTeamDetails, AppError> {
        let existing = find_link(db, id).await?;
        let event = find_event(db, event_id).await?;
        let team = find_team(db, team_id).await?;

        if Self::pair_exists(db, event_id, team_id, Some(id)).await? {
            return Err(AppError::Conflict(ALREADY_LINKED.to_string()));
        }

        let previous = (existing.event_id, existing.team_id);

        let mut active: event_team::ActiveModel = existing.into();
        active.event_id = Set(event_id);
        active.team_id = Set(team_id);
        let link = active.update(db).await.map_err(link_write_error)?;

        let details = EventTeamDetails { link, event, team };

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Update,
                AuditEntity::EventTeam,
                details.link.id,
                details.display_name(),
                format!(
                    "Link moved from event #{} / team #{} to team '{}' in event '{}'",
                    previous.0, previous.1, details.team.description, details.event.title
                ),
            ),
        )
        .await;

        Ok(details)
    }

    /// Remove a link. Returns `false` when no link has this id.
    pub async fn delete(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
    ) -> Result<bool, AppError> {
        let Some(link) = event_team::Entity::find_by_id(id).one(db).await? else {
            return Ok(false);
        };

        // Names are captured before the row disappears
        let event_title = event::Entity::find_by_id(link.event_id)
            .one(db)
            .await?
            .map_or_else(|| format!("Event #{}", link.event_id), |e| e.title);
        let team_description = team::Entity::find_by_id(link.team_id)
            .one(db)
            .await?
            .map_or_else(|| format!("Team #{}", link.team_id), |t| t.description);

        let result = event_team::Entity::delete_by_id(id).exec(db).await?;
        if result.rows_affected == 0 {
            // Removed by a concurrent request after the lookup
            return Ok(false);
        }

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Delete,
                AuditEntity::EventTeam,
                id,
                format!("{event_title} - {team_description}"),
                format!("Team '{team_description}' removed from event '{event_title}'"),
            ),
        )
        .await;

        Ok(true)
    }

    /// Whether `(event_id, team_id)` is already linked by a link other than `exclude_id`.
    async fn pair_exists(
        db: &DatabaseConnection,
        event_id: i32,
        team_id: i32,
        exclude_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let mut query = event_team::Entity::find()
            .filter(event_team::Column::EventId.eq(event_id))
            .filter(event_team::Column::TeamId.eq(team_id));
        if let Some(id) = exclude_id {
            query = query.filter(event_team::Column::Id.ne(id));
        }
        Ok(query.one(db).await?.is_some())
    }
}

fn link_name(event: &event::Model, team: &team::Model) -> String {
    format!("{} - {}", event.title, team.description)
}

/// A unique-index rejection means a concurrent request linked the same pair first.
fn link_write_error(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(ALREADY_LINKED.to_string())
    } else {
        AppError::from(err)
    }
}

async fn find_link(db: &DatabaseConnection, id: i32) -> Result<event_team::Model, AppError> {
    event_team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event team link not found.".to_string()))
}

async fn find_event(db: &DatabaseConnection, id: i32) -> Result<event::Model, AppError> {
    event::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))
}

async fn find_team(db: &DatabaseConnection, id: i32) -> Result<team::Model, AppError> {
    team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found.".to_string()))
}

/// Load the parents of `links` with one query per side.
async fn resolve(
    db: &DatabaseConnection,
    links: Vec<event_team::Model>,
) -> Result<Vec<EventTeamDetails>, AppError> {
    if links.is_empty() {
        return Ok(Vec::new());
    }

    let event_ids: Vec<i32> = links.iter().map(|l| l.event_id).collect();
    let team_ids: Vec<i32> = links.iter().map(|l| l.team_id).collect();

    let events: HashMap<i32, event::Model> = event::Entity::find()
        .filter(event::Column::Id.is_in(event_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
    let teams: HashMap<i32, team::Model> = team::Entity::find()
        .filter(team::Column::Id.is_in(team_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    Ok(links
        .into_iter()
        .filter_map(|link| {
            let event = events.get(&link.event_id).cloned();
            let team = teams.get(&link.team_id).cloned();
            if let (Some(event), Some(team)) = (event, team) {
                Some(EventTeamDetails { link, event, team })
            } else {
                tracing::warn!(link_id = link.id, "Skipping event team link with missing parent");
                None
            }
        })
        .collect())
}
