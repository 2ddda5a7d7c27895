//! In-process repositories backed by `RwLock`ed maps.
//!
//! Used by the test suites and handy for running the API without PostgreSQL.
//! They follow the same contracts as the PostgreSQL implementations.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ClassRepository, ScheduleRepository, TokenRepository, UserRepository};
use crate::error::{AppError, AppResult};
use crate::models::{
    plan_insert, plan_update, Class, ClassView, CreateClassDto, Id, InsertPlan, RefreshToken,
    Schedule, ScheduleCreate, UpdateClassDto, UpdatePlan, User, UserCreate,
};

/// Rows keyed by id plus the next id to hand out.
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<Id, T>,
    next_id: Id,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate(&mut self) -> Id {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

// ---- Users ----

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<Table<User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user record. Nothing in the API deletes users; tests use this.
    pub async fn remove(&self, id: Id) -> Option<User> {
        self.users.write().await.rows.remove(&id)
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        let users = self.users.read().await;
        users
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(AppError::NotFound)
    }

    async fn get_by_id(&self, id: Id) -> AppResult<User> {
        let users = self.users.read().await;
        users.rows.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn create(&self, user: UserCreate) -> AppResult<Id> {
        let mut users = self.users.write().await;
        if users.rows.values().any(|u| u.username == user.username) {
            return Err(AppError::AlreadyExists);
        }
        let id = users.allocate();
        users.rows.insert(
            id,
            User {
                id,
                username: user.username,
                password_hash: user.password_hash,
                role: user.role,
                created_at: user.created_at,
            },
        );
        Ok(id)
    }
}

// ---- Refresh tokens ----

#[derive(Clone, Default)]
pub struct MemoryTokenRepository {
    tokens: Arc<RwLock<BTreeMap<Id, RefreshToken>>>,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn get_by_user_id(&self, user_id: Id) -> AppResult<RefreshToken> {
        let tokens = self.tokens.read().await;
        tokens.get(&user_id).cloned().ok_or(AppError::NotFound)
    }

    async fn create_or_update(&self, token: RefreshToken) -> AppResult<()> {
        self.tokens.write().await.insert(token.user_id, token);
        Ok(())
    }
}

// ---- Schedules ----

#[derive(Clone, Default)]
pub struct MemoryScheduleRepository {
    schedules: Arc<RwLock<Table<Schedule>>>,
}

impl MemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleRepository for MemoryScheduleRepository {
    async fn get_by_id(&self, id: Id) -> AppResult<Schedule> {
        let schedules = self.schedules.read().await;
        schedules.rows.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn create(&self, schedule: ScheduleCreate) -> AppResult<Schedule> {
        let mut schedules = self.schedules.write().await;
        let id = schedules.allocate();
        let row = Schedule {
            id,
            user_id: schedule.user_id,
            title: schedule.title,
            created_at: schedule.created_at,
        };
        schedules.rows.insert(id, row.clone());
        Ok(row)
    }

    async fn list_by_user(&self, user_id: Id) -> AppResult<Vec<Schedule>> {
        let schedules = self.schedules.read().await;
        Ok(schedules
            .rows
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }
}

// ---- Classes ----

/// Classes may only reference schedules that exist in `schedules`.
#[derive(Clone)]
pub struct MemoryClassRepository {
    classes: Arc<RwLock<Table<Class>>>,
    schedules: MemoryScheduleRepository,
}

impl MemoryClassRepository {
    pub fn new(schedules: MemoryScheduleRepository) -> Self {
        Self {
            classes: Arc::default(),
            schedules,
        }
    }

    async fn ensure_schedule(&self, schedule_id: Id) -> AppResult<()> {
        self.schedules.get_by_id(schedule_id).await.map(|_| ())
    }
}

fn of_schedule(table: &Table<Class>, schedule_id: Id) -> Vec<Class> {
    table
        .rows
        .values()
        .filter(|c| c.schedule_id == schedule_id)
        .cloned()
        .collect()
}

#[async_trait]
impl ClassRepository for MemoryClassRepository {
    async fn get_by_id(&self, id: Id) -> AppResult<Class> {
        let classes = self.classes.read().await;
        classes.rows.get(&id).cloned().ok_or(AppError::NotFound)
    }

    async fn get_all_views(&self, schedule_id: Id) -> AppResult<Vec<ClassView>> {
        let classes = self.classes.read().await;
        let mut views = of_schedule(&classes, schedule_id);
        views.sort_by_key(|c| (c.weekday, c.number, c.parity.as_str()));
        Ok(views)
    }

    async fn create_or_split(&self, class: CreateClassDto) -> AppResult<Id> {
        self.ensure_schedule(class.schedule_id).await?;
        let mut classes = self.classes.write().await;
        let existing = of_schedule(&classes, class.schedule_id);
        if let InsertPlan::Split { class_id, parity } = plan_insert(&existing, &class)? {
            if let Some(c) = classes.rows.get_mut(&class_id) {
                c.parity = parity;
            }
        }
        let id = classes.allocate();
        classes.rows.insert(
            id,
            Class {
                id,
                schedule_id: class.schedule_id,
                title: class.title,
                teacher: class.teacher,
                room: class.room,
                weekday: class.weekday,
                number: class.number,
                parity: class.parity,
            },
        );
        Ok(id)
    }

    async fn update_or_switch(
        &self,
        id: Id,
        schedule_id: Id,
        update: UpdateClassDto,
    ) -> AppResult<()> {
        self.ensure_schedule(schedule_id).await?;
        let mut classes = self.classes.write().await;
        let current = classes.rows.get(&id).cloned().ok_or(AppError::NotFound)?;
        let existing = of_schedule(&classes, schedule_id);
        match plan_update(&current, &update, &existing)? {
            UpdatePlan::Update(updated) => {
                classes.rows.insert(id, updated);
            }
            UpdatePlan::Switch { updated, displaced } => {
                classes.rows.insert(displaced.id, displaced);
                classes.rows.insert(id, updated);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: Id) -> AppResult<()> {
        let mut classes = self.classes.write().await;
        classes.rows.remove(&id).map(|_| ()).ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Parity, Role};
    use chrono::Utc;

    fn new_user(name: &str) -> UserCreate {
        UserCreate {
            username: name.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Student,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn users_are_unique_by_username() {
        let repo = MemoryUserRepository::new();
        let id = repo.create(new_user("alice")).await.unwrap();
        assert_eq!(repo.get_by_username("alice").await.unwrap().id, id);
        assert!(matches!(
            repo.create(new_user("alice")).await,
            Err(AppError::AlreadyExists)
        ));
        assert!(matches!(
            repo.get_by_username("bob").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn token_create_or_update_keeps_one_per_user() {
        let repo = MemoryTokenRepository::new();
        for token in ["t1", "t2"] {
            repo.create_or_update(RefreshToken {
                user_id: 5,
                refresh_token: token.to_string(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();
        }
        assert_eq!(repo.get_by_user_id(5).await.unwrap().refresh_token, "t2");
        assert_eq!(repo.tokens.read().await.len(), 1);
    }

    async fn class_repo_with_schedule() -> (MemoryClassRepository, Id) {
        let schedules = MemoryScheduleRepository::new();
        let schedule = schedules
            .create(ScheduleCreate {
                user_id: 1,
                title: "Group 101".into(),
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        (MemoryClassRepository::new(schedules), schedule.id)
    }

    fn class_dto(schedule_id: Id, weekday: i16, number: i16, parity: Parity) -> CreateClassDto {
        CreateClassDto {
            schedule_id,
            title: "Algebra".into(),
            teacher: None,
            room: None,
            weekday,
            number,
            parity,
        }
    }

    #[tokio::test]
    async fn create_or_split_requires_existing_schedule() {
        let (repo, _) = class_repo_with_schedule().await;
        assert!(matches!(
            repo.create_or_split(class_dto(999, 1, 1, Parity::Always)).await,
            Err(AppError::NotFound)
        ));
        assert!(repo.get_all_views(999).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_or_switch_rejects_widening_into_occupied_slot() {
        let (repo, schedule_id) = class_repo_with_schedule().await;
        let even = repo
            .create_or_split(class_dto(schedule_id, 1, 1, Parity::Even))
            .await
            .unwrap();
        let odd = repo
            .create_or_split(class_dto(schedule_id, 1, 1, Parity::Odd))
            .await
            .unwrap();
        let err = repo
            .update_or_switch(
                even,
                schedule_id,
                UpdateClassDto {
                    parity: Some(Parity::Always),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists));
        assert_eq!(repo.get_by_id(even).await.unwrap().parity, Parity::Even);
        assert_eq!(repo.get_by_id(odd).await.unwrap().parity, Parity::Odd);
    }

    #[tokio::test]
    async fn create_or_split_narrows_existing_class() {
        let (repo, schedule_id) = class_repo_with_schedule().await;
        let dto = |parity| CreateClassDto {
            schedule_id,
            title: "Algebra".into(),
            teacher: None,
            room: None,
            weekday: 2,
            number: 3,
            parity,
        };
        let first = repo.create_or_split(dto(Parity::Always)).await.unwrap();
        let second = repo.create_or_split(dto(Parity::Odd)).await.unwrap();
        assert_eq!(repo.get_by_id(first).await.unwrap().parity, Parity::Even);
        assert_eq!(repo.get_by_id(second).await.unwrap().parity, Parity::Odd);
        assert!(matches!(
            repo.create_or_split(dto(Parity::Odd)).await,
            Err(AppError::AlreadyExists)
        ));
        assert_eq!(repo.get_all_views(schedule_id).await.unwrap().len(), 2);
    }
}
