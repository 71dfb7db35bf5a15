mod event_service;
mod event_team_service;
mod favourite_service;
mod log_service;
mod team_service;
mod user_service;

pub use event_service::{EventService, NewEvent};
pub use event_team_service::{ALREADY_LINKED, EventTeamDetails, EventTeamService};
pub use favourite_service::{ALREADY_FAVOURITE, FavouriteService};
pub use log_service::LogService;
pub use team_service::{NewTeam, TeamService};
pub use user_service::{NewUser, UserChanges, UserService};

use sea_orm::{DbErr, SqlErr};

/// Whether the store rejected a write because of a unique index.
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Whether the store rejected a write because a referenced row does not exist.
fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
