//! Database layer: pool and PostgreSQL repositories.

mod pool;
mod repositories;

pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::*;
