use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Select,
};

use crate::audit::NewLogEntry;
use crate::entities::log_entry;
use crate::error::AppError;

/// Append-only access to the audit table.
pub struct LogService;

impl LogService {
    /// Store an audit entry, stamping it with the current time when it carries none.
    ///
    /// # Errors
    ///
    /// Returns the database error if the insert fails.
    pub async fn append(
        db: &DatabaseConnection,
        entry: NewLogEntry,
    ) -> Result<log_entry::Model, DbErr> {
        let created_at = entry
            .created_at
            .unwrap_or_else(|| Utc::now().fixed_offset());

        log_entry::ActiveModel {
            user_id: Set(entry.user_id),
            user_role: Set(entry.user_role),
            action: Set(entry.action.as_str().to_string()),
            entity_type: Set(entry.entity_type),
            entity_id: Set(entry.entity_id),
            entity_name: Set(entry.entity_name),
            details: Set(entry.details),
            created_at: Set(created_at),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    /// All entries, newest first.
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<log_entry::Model>, AppError> {
        Ok(newest_first(log_entry::Entity::find()).all(db).await?)
    }

    /// Entries written by one user, newest first.
    pub async fn list_by_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<log_entry::Model>, AppError> {
        Ok(newest_first(
            log_entry::Entity::find().filter(log_entry::Column::UserId.eq(user_id)),
        )
        .all(db)
        .await?)
    }

    /// Entries about one entity type (`"Event"`, `"EventTeam"`, ...), newest first.
    pub async fn list_by_entity_type(
        db: &DatabaseConnection,
        entity_type: &str,
    ) -> Result<Vec<log_entry::Model>, AppError> {
        Ok(newest_first(
            log_entry::Entity::find().filter(log_entry::Column::EntityType.eq(entity_type)),
        )
        .all(db)
        .await?)
    }
}

/// Entries created within the same instant keep their insertion order reversed.
fn newest_first(query: Select<log_entry::Entity>) -> Select<log_entry::Entity> {
    query
        .order_by_desc(log_entry::Column::CreatedAt)
        .order_by_desc(log_entry::Column::Id)
}
