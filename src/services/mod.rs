//! Business logic: sessions, schedules and classes.

pub mod auth;
pub mod class;
pub mod schedule;

pub use auth::AuthService;
pub use class::ClassService;
pub use schedule::ScheduleService;
