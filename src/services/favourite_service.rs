use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

use super::{is_foreign_key_violation, is_unique_violation};
use crate::entities::{event, user, user_favourite};
use crate::error::AppError;

/// Message returned when a user favourites the same event twice.
pub const ALREADY_FAVOURITE: &str = "Event is already in favourites.";

/// Users' saved events. Favourites are not audited.
pub struct FavouriteService;

impl FavouriteService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<user_favourite::Model>, AppError> {
        Ok(user_favourite::Entity::find()
            .order_by_asc(user_favourite::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: i32,
    ) -> Result<Vec<user_favourite::Model>, AppError> {
        Ok(user_favourite::Entity::find()
            .filter(user_favourite::Column::UserId.eq(user_id))
            .order_by_asc(user_favourite::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<user_favourite::Model, AppError> {
        user_favourite::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Favourite not found.".to_string()))
    }

    /// Save `event_id` for `user_id`.
    ///
    /// Missing ids and duplicates are request errors (400); ids that reference nothing are 404.
    pub async fn create(
        db: &DatabaseConnection,
        user_id: Option<i32>,
        event_id: Option<i32>,
    ) -> Result<user_favourite::Model, AppError> {
        let (Some(user_id), Some(event_id)) = (user_id, event_id) else {
            return Err(AppError::BadRequest(
                "UserId and EventId are required.".to_string(),
            ));
        };

        if user::Entity::find_by_id(user_id).one(db).await?.is_none() {
            return Err(AppError::NotFound("User not found.".to_string()));
        }
        if event::Entity::find_by_id(event_id).one(db).await?.is_none() {
            return Err(AppError::NotFound("Event not found.".to_string()));
        }

        let duplicate = user_favourite::Entity::find()
            .filter(user_favourite::Column::UserId.eq(user_id))
            .filter(user_favourite::Column::EventId.eq(event_id))
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(AppError::BadRequest(ALREADY_FAVOURITE.to_string()));
        }

        user_favourite::ActiveModel {
            user_id: Set(user_id),
            event_id: Set(event_id),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(favourite_write_error)
    }

    /// Overwrite both sides of an existing favourite.
    ///
    /// No duplicate pre-check is made here; a collision is only caught by the unique index.
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        user_id: i32,
        event_id: i32,
    ) -> Result<user_favourite::Model, AppError> {
        let existing = Self::get(db, id).await?;

        let mut active: user_favourite::ActiveModel = existing.into();
        active.user_id = Set(user_id);
        active.event_id = Set(event_id);
        active.update(db).await.map_err(favourite_write_error)
    }

    /// Remove a favourite. Returns `false` when no favourite has this id.
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, AppError> {
        let result = user_favourite::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected > 0)
    }
}

fn favourite_write_error(err: DbErr) -> AppError {
    if is_unique_violation(&err) {
        AppError::BadRequest(ALREADY_FAVOURITE.to_string())
    } else if is_foreign_key_violation(&err) {
        AppError::NotFound("User or event not found.".to_string())
    } else {
        AppError::from(err)
    }
}
