use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

use crate::audit::{self, Actor, AuditAction, AuditEntity, AuditSink, NewLogEntry};
use crate::auth::password;
use crate::config::BootstrapAdmin;
use crate::entities::{Role, team, user};
use crate::error::AppError;

/// Fields of a user being created. Shape validation happens before this point.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub date_of_birth: NaiveDate,
    pub profile_image: Option<String>,
    pub team_id: Option<i32>,
}

/// Mutable profile fields; every field overwrites the stored value.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub date_of_birth: NaiveDate,
    pub profile_image: Option<String>,
    pub team_id: Option<i32>,
}

pub struct UserService;

impl UserService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<user::Model>, AppError> {
        Ok(user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await?)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))
    }

    /// Look up a user by email, ignoring case.
    pub async fn find_by_email(
        db: &DatabaseConnection,
        email: &str,
    ) -> Result<Option<user::Model>, AppError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(db)
            .await?)
    }

    /// Create a user.
    ///
    /// When `actor` is `None` the account is self-registered and the audit entry is
    /// attributed to the new user.
    pub async fn create(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: Option<&Actor>,
        new_user: NewUser,
    ) -> Result<user::Model, AppError> {
        let email = normalize_email(&new_user.email);
        let username = new_user.username.trim().to_string();

        Self::ensure_unique(db, &email, &username, None).await?;
        if let Some(team_id) = new_user.team_id {
            ensure_team_exists(db, team_id).await?;
        }

        let password_hash = password::hash_password(&new_user.password)?;

        let created = user::ActiveModel {
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(new_user.role.as_str().to_string()),
            date_of_birth: Set(new_user.date_of_birth),
            profile_image: Set(new_user.profile_image),
            team_id: Set(new_user.team_id),
            created_at: Set(Utc::now().fixed_offset()),
            last_login_at: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let actor = actor.copied().unwrap_or_else(|| Actor::from(&created));
        audit::record(
            audit,
            NewLogEntry::new(
                &actor,
                AuditAction::Create,
                AuditEntity::User,
                created.id,
                created.username.clone(),
                format!(
                    "User '{}' created with role {}",
                    created.username, created.role
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
        changes: UserChanges,
    ) -> Result<user::Model, AppError> {
        let existing = Self::get(db, id).await?;

        let email = normalize_email(&changes.email);
        let username = changes.username.trim().to_string();

        Self::ensure_unique(db, &email, &username, Some(id)).await?;
        if let Some(team_id) = changes.team_id {
            ensure_team_exists(db, team_id).await?;
        }

        let mut active: user::ActiveModel = existing.into();
        active.username = Set(username);
        active.email = Set(email);
        active.role = Set(changes.role.as_str().to_string());
        active.date_of_birth = Set(changes.date_of_birth);
        active.profile_image = Set(changes.profile_image);
        active.team_id = Set(changes.team_id);
        let updated = active.update(db).await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Update,
                AuditEntity::User,
                updated.id,
                updated.username.clone(),
                format!("User '{}' updated", updated.username),
            ),
        )
        .await;

        Ok(updated)
    }

    /// Delete a user. Managers still assigned to a team cannot be deleted.
    pub async fn delete(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        actor: &Actor,
        id: i32,
    ) -> Result<(), AppError> {
        let existing = Self::get(db, id).await?;

        let managed = team::Entity::find()
            .filter(team::Column::ManagerId.eq(id))
            .count(db)
            .await?;
        if managed > 0 {
            return Err(AppError::Conflict(
                "User still manages a team; assign a new manager first.".to_string(),
            ));
        }

        let username = existing.username.clone();
        user::Entity::delete_by_id(id).exec(db).await?;

        audit::record(
            audit,
            NewLogEntry::new(
                actor,
                AuditAction::Delete,
                AuditEntity::User,
                id,
                username.clone(),
                format!("User '{username}' deleted"),
            ),
        )
        .await;

        Ok(())
    }

    /// Check credentials and stamp the login time.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(
        db: &DatabaseConnection,
        email: &str,
        supplied_password: &str,
    ) -> Result<user::Model, AppError> {
        let invalid = || AppError::Unauthorized("Invalid email or password.".to_string());

        let user_model = Self::find_by_email(db, email).await?.ok_or_else(invalid)?;

        if !password::verify_password(supplied_password, &user_model.password_hash)? {
            return Err(invalid());
        }

        let mut active: user::ActiveModel = user_model.into();
        active.last_login_at = Set(Some(Utc::now().fixed_offset()));
        Ok(active.update(db).await?)
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        id: i32,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let user_model = Self::get(db, id).await?;

        if !password::verify_password(current_password, &user_model.password_hash)? {
            return Err(AppError::Unauthorized(
                "Current password is incorrect.".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user_model.into();
        active.password_hash = Set(password::hash_password(new_password)?);
        active.update(db).await?;
        Ok(())
    }

    /// Create the configured administrator unless an account with that email exists.
    ///
    /// Returns `true` when a new account was created.
    pub async fn ensure_admin(
        db: &DatabaseConnection,
        audit: &dyn AuditSink,
        admin: &BootstrapAdmin,
    ) -> Result<bool, AppError> {
        if Self::find_by_email(db, &admin.email).await?.is_some() {
            return Ok(false);
        }

        let created = Self::create(
            db,
            audit,
            None,
            NewUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: Role::Admin,
                date_of_birth: NaiveDate::default(),
                profile_image: None,
                team_id: None,
            },
        )
        .await?;

        tracing::info!(user_id = created.id, email = %created.email, "Bootstrap admin created");
        Ok(true)
    }

    /// Reject an email or username already held by another user (case-insensitive).
    async fn ensure_unique(
        db: &DatabaseConnection,
        email: &str,
        username: &str,
        exclude_id: Option<i32>,
    ) -> Result<(), AppError> {
        let mut email_query = user::Entity::find().filter(user::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            email_query = email_query.filter(user::Column::Id.ne(id));
        }
        if email_query.one(db).await?.is_some() {
            return Err(AppError::Conflict("Email already registered.".to_string()));
        }

        let mut username_query = user::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                .eq(username.to_lowercase()),
        );
        if let Some(id) = exclude_id {
            username_query = username_query.filter(user::Column::Id.ne(id));
        }
        if username_query.one(db).await?.is_some() {
            return Err(AppError::Conflict("Username already taken.".to_string()));
        }

        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn ensure_team_exists(db: &DatabaseConnection, team_id: i32) -> Result<(), AppError> {
    team::Entity::find_by_id(team_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Team not found.".to_string()))
}
