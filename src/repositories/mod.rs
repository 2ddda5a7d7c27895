//! Repository interfaces consumed by the services.
//!
//! Lookups that find nothing return [`AppError::NotFound`](crate::error::AppError::NotFound);
//! unique-key collisions return [`AppError::AlreadyExists`](crate::error::AppError::AlreadyExists).
//! PostgreSQL implementations live in [`crate::db`], in-process ones in [`memory`].

pub mod memory;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{
    Class, ClassView, CreateClassDto, Id, RefreshToken, Schedule, ScheduleCreate, UpdateClassDto,
    User, UserCreate,
};

pub use memory::{
    MemoryClassRepository, MemoryScheduleRepository, MemoryTokenRepository, MemoryUserRepository,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_username(&self, username: &str) -> AppResult<User>;
    async fn get_by_id(&self, id: Id) -> AppResult<User>;
    async fn create(&self, user: UserCreate) -> AppResult<Id>;
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn get_by_user_id(&self, user_id: Id) -> AppResult<RefreshToken>;
    /// Store the user's refresh token, replacing any previous one.
    async fn create_or_update(&self, token: RefreshToken) -> AppResult<()>;
}

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn get_by_id(&self, id: Id) -> AppResult<Schedule>;
    async fn create(&self, schedule: ScheduleCreate) -> AppResult<Schedule>;
    async fn list_by_user(&self, user_id: Id) -> AppResult<Vec<Schedule>>;
}

#[async_trait]
pub trait ClassRepository: Send + Sync {
    async fn get_by_id(&self, id: Id) -> AppResult<Class>;
    async fn get_all_views(&self, schedule_id: Id) -> AppResult<Vec<ClassView>>;
    /// Insert a class, splitting an every-week class in the same slot if needed.
    async fn create_or_split(&self, class: CreateClassDto) -> AppResult<Id>;
    /// Update a class, switching places with a class occupying the target slot.
    async fn update_or_switch(
        &self,
        id: Id,
        schedule_id: Id,
        update: UpdateClassDto,
    ) -> AppResult<()>;
    async fn delete(&self, id: Id) -> AppResult<()>;
}
