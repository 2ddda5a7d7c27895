//! Schedules: a named timetable owned by one user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Id;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub id: Id,
    pub user_id: Id,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ScheduleCreate {
    pub user_id: Id,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
