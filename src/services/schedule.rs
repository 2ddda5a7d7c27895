//! Schedules owned by users.

use crate::error::AppResult;
use crate::models::{Id, Schedule, ScheduleCreate};
use crate::repositories::ScheduleRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct ScheduleService {
    repo: Arc<dyn ScheduleRepository>,
}

impl ScheduleService {
    pub fn new(repo: Arc<dyn ScheduleRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, user_id: Id, title: &str) -> AppResult<Schedule> {
        let schedule = self
            .repo
            .create(ScheduleCreate {
                user_id,
                title: title.trim().to_string(),
                created_at: Utc::now(),
            })
            .await?;
        info!(schedule_id = schedule.id, user_id, "schedule created");
        Ok(schedule)
    }

    pub async fn get_by_id(&self, id: Id) -> AppResult<Schedule> {
        self.repo.get_by_id(id).await
    }

    pub async fn list_for_user(&self, user_id: Id) -> AppResult<Vec<Schedule>> {
        self.repo.list_by_user(user_id).await
    }
}
