//! Audit trail: who did what to which entity.
//!
//! Writes go through the [`AuditSink`] trait so the primary operation never depends on the
//! audit store being healthy. [`record`] is the only entry point services use; it swallows
//! and logs every failure.

use std::fmt;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::entities::{Role, log_entry, user};
use crate::services::LogService;

/// Kind of mutation being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entity classifier stored in `log_entry.entity_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEntity {
    User,
    Team,
    Event,
    EventTeam,
}

impl AuditEntity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Team => "Team",
            Self::Event => "Event",
            Self::EventTeam => "EventTeam",
        }
    }
}

/// The user performing a mutation, with their role captured at the time of the action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

impl From<&user::Model> for Actor {
    fn from(u: &user::Model) -> Self {
        Self {
            user_id: u.id,
            role: u.role(),
        }
    }
}

/// An audit record that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub user_id: i32,
    pub user_role: String,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: i32,
    pub entity_name: String,
    pub details: String,
    /// Assigned by the writer when absent.
    pub created_at: Option<DateTimeWithTimeZone>,
}

impl NewLogEntry {
    /// Build an entry attributed to `actor`.
    pub fn new(
        actor: &Actor,
        action: AuditAction,
        entity: AuditEntity,
        entity_id: i32,
        entity_name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            user_id: actor.user_id,
            user_role: actor.role.as_str().to_string(),
            action,
            entity_type: entity.as_str().to_string(),
            entity_id,
            entity_name: entity_name.into(),
            details: details.into(),
            created_at: None,
        }
    }
}

/// Destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync + fmt::Debug {
    /// Persist `entry` and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be stored.
    async fn append(&self, entry: NewLogEntry) -> anyhow::Result<log_entry::Model>;
}

/// Sink writing to the `log_entry` table of the application database.
#[derive(Debug, Clone)]
pub struct DbAuditSink {
    db: DatabaseConnection,
}

impl DbAuditSink {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for DbAuditSink {
    async fn append(&self, entry: NewLogEntry) -> anyhow::Result<log_entry::Model> {
        Ok(LogService::append(&self.db, entry).await?)
    }
}

/// Write `entry` to `sink` without ever failing the caller.
///
/// Returns whether the entry was stored.
pub async fn record(sink: &dyn AuditSink, entry: NewLogEntry) -> bool {
    let action = entry.action;
    let entity_type = entry.entity_type.clone();
    let entity_id = entry.entity_id;

    match sink.append(entry).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(
                %action,
                entity_type = %entity_type,
                entity_id,
                error = %format!("{err:#}"),
                "Failed to write audit log entry"
            );
            false
        }
    }
}
