use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryOrder};

use crate::audit::{self, Actor, AuditAction, AuditEntity, AuditSink, NewLogEntry};
use crate::entities::{EventStatus, event, team};
use crate::error::AppError;

/// Writable event fields.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub location: String,
    pub date: DateTimeWithTimeZone,
    pub description: String,
    pub detail: String,
    pub status: EventStatus,
    pub image: Option<String>,
}

pub struct EventService;

impl EventService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<event::Model>, AppError> {
        Ok(event::Entity::find()
            .order_by_asc(event::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<event::Model, AppError> {
        event::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found.".to_string()))
    }

    /// Teams linked to the event.
    pub async fn teams(
        db: &DatabaseConnection,
        event: &event::Model,
    ) -> Result<Vec<team::Model>, AppError> {
        Ok(event
            .find_related(team::Entity)
            .order_by_desc(team::Column::Points)
            .all(db)
            .await?)
    }

    pub async fn create(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        new_event: NewEvent,
    ) -> Result<event::Model, AppError> {
        let created = event::ActiveModel {
            title: Set(new_event.title),
            location: Set(new_event.location),
            date: Set(new_event.date),
            description: Set(new_event.description),
            detail: Set(new_event.detail),
            status: Set(new_event.status.as_str().to_string()),
            image: Set(new_event.image),
            created_at: Set(Utc::now().fixed_offset()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Create,
                AuditEntity::Event,
                created.id,
                created.title.clone(),
                format!(
                    "Event '{}' created at {} ({})",
                    created.title, created.location, created.status
                ),
            ),
        )
        .await;

        Ok(created)
    }

    pub async fn update(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
        changes: NewEvent,
    ) -> Result<event::Model, AppError> {
        let existing = Self::get(db, id).await?;
        let previous_status = existing.status.clone();

        let mut active: event::ActiveModel = existing.into();
        active.title = Set(changes.title);
        active.location = Set(changes.location);
        active.date = Set(changes.date);
        active.description = Set(changes.description);
        active.detail = Set(changes.detail);
        active.status = Set(changes.status.as_str().to_string());
        active.image = Set(changes.image);
        let updated = active.update(db).await?;

        let details = if previous_status == updated.status {
            format!("Event '{}' updated", updated.title)
        } else {
            format!(
                "Event '{}' updated, status {} -> {}",
                updated.title, previous_status, updated.status
            )
        };

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Update,
                AuditEntity::Event,
                updated.id,
                updated.title.clone(),
                details,
            ),
        )
        .await;

        Ok(updated)
    }

    /// Delete an event together with its team links and favourites.
    pub async fn delete(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
    ) -> Result<event::Model, AppError> {
        let existing = Self::get(db, id).await?;

        event::Entity::delete_by_id(id).exec(db).await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Delete,
                AuditEntity::Event,
                id,
                existing.title.clone(),
                format!("Event '{}' deleted", existing.title),
            ),
        )
        .await;

        Ok(existing)
    }
}
