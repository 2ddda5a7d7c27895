//! Domain models: users, refresh tokens, schedules and classes.

pub mod class;
pub mod schedule;
pub mod token;
pub mod user;

pub use class::*;
pub use schedule::*;
pub use token::*;
pub use user::*;

/// Database identifier (PostgreSQL `BIGSERIAL`).
pub type Id = i64;
