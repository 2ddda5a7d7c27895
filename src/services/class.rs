//! Class CRUD; changes are only allowed to the owner of the class's schedule.

use crate::error::{AppError, AppResult};
use crate::models::{Class, ClassView, CreateClassDto, Id, UpdateClassDto};
use crate::repositories::{ClassRepository, ScheduleRepository};
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct ClassService {
    repo: Arc<dyn ClassRepository>,
    schedule_repo: Arc<dyn ScheduleRepository>,
}

impl ClassService {
    pub fn new(repo: Arc<dyn ClassRepository>, schedule_repo: Arc<dyn ScheduleRepository>) -> Self {
        Self {
            repo,
            schedule_repo,
        }
    }

    #[instrument(skip(self, class), fields(schedule_id = class.schedule_id))]
    pub async fn create(&self, class: CreateClassDto) -> AppResult<Id> {
        let id = self.repo.create_or_split(class).await?;
        info!(class_id = id, "class created");
        Ok(id)
    }

    pub async fn get_by_id(&self, id: Id) -> AppResult<Class> {
        self.repo.get_by_id(id).await
    }

    pub async fn get_all(&self, schedule_id: Id) -> AppResult<Vec<ClassView>> {
        self.repo.get_all_views(schedule_id).await
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, user_id: Id, id: Id, update: UpdateClassDto) -> AppResult<()> {
        let class = self.verify_owner(user_id, id).await?;
        self.repo
            .update_or_switch(id, class.schedule_id, update)
            .await?;
        info!(class_id = id, "class updated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Id, id: Id) -> AppResult<()> {
        self.verify_owner(user_id, id).await?;
        self.repo.delete(id).await?;
        info!(class_id = id, "class deleted");
        Ok(())
    }

    /// Load the class and fail unless `user_id` owns its schedule.
    async fn verify_owner(&self, user_id: Id, class_id: Id) -> AppResult<Class> {
        let class = self.repo.get_by_id(class_id).await?;
        let schedule = self.schedule_repo.get_by_id(class.schedule_id).await?;
        if schedule.user_id != user_id {
            warn!(user_id, class_id, owner = schedule.user_id, "not the schedule owner");
            return Err(AppError::DontHavePermission);
        }
        Ok(class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parity, ScheduleCreate};
    use crate::repositories::{MemoryClassRepository, MemoryScheduleRepository};
    use chrono::Utc;

    const OWNER: Id = 1;
    const STRANGER: Id = 2;

    async fn setup() -> (ClassService, MemoryClassRepository, Id) {
        let schedules = MemoryScheduleRepository::new();
        let classes = MemoryClassRepository::new(schedules.clone());
        let schedule = schedules
            .create(ScheduleCreate {
                user_id: OWNER,
                title: "Group 101".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        let service = ClassService::new(Arc::new(classes.clone()), Arc::new(schedules));
        let class_id = service
            .create(CreateClassDto {
                schedule_id: schedule.id,
                title: "Algebra".into(),
                teacher: Some("Dr. Smith".into()),
                room: Some("204".into()),
                weekday: 1,
                number: 2,
                parity: Parity::Always,
            })
            .await
            .unwrap();
        (service, classes, class_id)
    }

    #[tokio::test]
    async fn owner_can_update_and_delete() {
        let (service, _, id) = setup().await;
        service
            .update(
                OWNER,
                id,
                UpdateClassDto {
                    room: Some("301".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(service.get_by_id(id).await.unwrap().room.as_deref(), Some("301"));

        service.delete(OWNER, id).await.unwrap();
        assert!(matches!(service.get_by_id(id).await, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn stranger_cannot_update_and_nothing_is_written() {
        let (service, classes, id) = setup().await;
        let before = classes.get_by_id(id).await.unwrap();
        let err = service
            .update(
                STRANGER,
                id,
                UpdateClassDto {
                    title: Some("Hijacked".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DontHavePermission));
        assert_eq!(classes.get_by_id(id).await.unwrap(), before);
    }

    #[tokio::test]
    async fn stranger_cannot_delete() {
        let (service, _, id) = setup().await;
        let err = service.delete(STRANGER, id).await.unwrap_err();
        assert!(matches!(err, AppError::DontHavePermission));
        assert!(service.get_by_id(id).await.is_ok());
    }

    #[tokio::test]
    async fn missing_class_is_not_found() {
        let (service, _, _) = setup().await;
        let err = service.delete(OWNER, 999).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }
}
