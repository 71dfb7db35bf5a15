pub mod event;
pub mod event_status;
pub mod event_team;
pub mod log_entry;
pub mod role;
pub mod team;
pub mod user;
pub mod user_favourite;

pub use event_status::EventStatus;
pub use role::Role;
