use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};

use crate::audit::{self, Actor, AuditAction, AuditEntity, AuditSink, NewLogEntry};
use crate::entities::{Role, event, team, user};
use crate::error::AppError;

/// Writable team fields.
#[derive(Debug, Clone)]
pub struct NewTeam {
    pub description: String,
    pub points: i32,
    pub image: Option<String>,
    pub manager_id: i32,
}

pub struct TeamService;

impl TeamService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<team::Model>, AppError> {
        Ok(team::Entity::find()
            .order_by_asc(team::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<team::Model, AppError> {
        team::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Team not found.".to_string()))
    }

    /// Users affiliated with the team.
    pub async fn players(
        db: &DatabaseConnection,
        team: &team::Model,
    ) -> Result<Vec<user::Model>, AppError> {
        Ok(team
            .find_related(user::Entity)
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?)
    }

    /// Events the team is linked to.
    pub async fn events(
        db: &DatabaseConnection,
        team: &team::Model,
    ) -> Result<Vec<event::Model>, AppError> {
        Ok(team
            .find_related(event::Entity)
            .order_by_asc(event::Column::Date)
            .all(db)
            .await?)
    }

    pub async fn create(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        new_team: NewTeam,
    ) -> Result<team::Model, AppError> {
        let manager = ensure_manager(db, new_team.manager_id).await?;

        let created = team::ActiveModel {
            description: Set(new_team.description),
            points: Set(new_team.points),
            image: Set(new_team.image),
            manager_id: Set(new_team.manager_id),
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
                AuditEntity::Team,
                created.id,
                created.description.clone(),
                format!(
                    "Team '{}' created with manager '{}'",
                    created.description, manager.username
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
        changes: NewTeam,
    ) -> Result<team::Model, AppError> {
        let existing = Self::get(db, id).await?;
        let manager = ensure_manager(db, changes.manager_id).await?;

        let mut active: team::ActiveModel = existing.into();
        active.description = Set(changes.description);
        active.points = Set(changes.points);
        active.image = Set(changes.image);
        active.manager_id = Set(changes.manager_id);
        let updated = active.update(db).await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Update,
                AuditEntity::Team,
                updated.id,
                updated.description.clone(),
                format!(
                    "Team '{}' updated: {} points, manager '{}'",
                    updated.description, updated.points, manager.username
                ),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Point the team at a freshly uploaded image.
    pub async fn set_image(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
        image: String,
    ) -> Result<team::Model, AppError> {
        let existing = Self::get(db, id).await?;

        let mut active: team::ActiveModel = existing.into();
        active.image = Set(Some(image));
        let updated = active.update(db).await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Update,
                AuditEntity::Team,
                updated.id,
                updated.description.clone(),
                format!("Team '{}' image updated", updated.description),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Delete a team. Event links go with it; players lose their affiliation.
    pub async fn delete(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
    ) -> Result<team::Model, AppError> {
        let existing = Self::get(db, id).await?;

        team::Entity::delete_by_id(id).exec(db).await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Delete,
                AuditEntity::Team,
                id,
                existing.description.clone(),
                format!("Team '{}' deleted", existing.description),
            ),
        )
        .await;

        Ok(existing)
    }
}

/// The designated manager must exist and currently hold the manager role.
async fn ensure_manager(db: &DatabaseConnection, manager_id: i32) -> Result<user::Model, AppError> {
    let manager = user::Entity::find_by_id(manager_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Manager not found.".to_string()))?;

    if manager.role() != Role::Manager {
        return Err(AppError::Conflict(format!(
            "User '{}' does not have the manager role.",
            manager.username
        )));
    }

    Ok(manager)
}
