//! PostgreSQL repositories: users, refresh tokens, schedules, classes.

use crate::error::{AppError, AppResult};
use crate::models::{
    plan_insert, plan_update, Class, ClassView, CreateClassDto, Id, InsertPlan, Parity,
    RefreshToken, Role, Schedule, ScheduleCreate, UpdateClassDto, UpdatePlan, User, UserCreate,
};
use crate::repositories::{ClassRepository, ScheduleRepository, TokenRepository, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Postgres, Transaction};

use super::DbPool;

/// Unique-key violations become `AlreadyExists`, everything else stays a db error.
fn map_unique(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::AlreadyExists,
        _ => AppError::Db(e),
    }
}

// ---- User ----

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> AppResult<Self> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown role: {}", row.role)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: DbPool,
}

impl PgUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_username(&self, username: &str) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(AppError::NotFound)?.try_into()
    }

    async fn get_by_id(&self, id: Id) -> AppResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(AppError::NotFound)?.try_into()
    }

    async fn create(&self, user: UserCreate) -> AppResult<Id> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique)?;
        Ok(row.0)
    }
}

// ---- Refresh tokens (one row per user) ----

#[derive(Debug, FromRow)]
pub struct RefreshTokenRow {
    pub user_id: i64,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PgTokenRepository {
    pool: DbPool,
}

impl PgTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PgTokenRepository {
    async fn get_by_user_id(&self, user_id: Id) -> AppResult<RefreshToken> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT user_id, refresh_token, updated_at FROM refresh_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound)?;
        Ok(RefreshToken {
            user_id: row.user_id,
            refresh_token: row.refresh_token,
            updated_at: row.updated_at,
        })
    }

    async fn create_or_update(&self, token: RefreshToken) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, refresh_token, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET refresh_token = EXCLUDED.refresh_token, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(token.user_id)
        .bind(&token.refresh_token)
        .bind(token.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// ---- Schedules ----

#[derive(Debug, FromRow)]
pub struct ScheduleRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Schedule {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgScheduleRepository {
    pool: DbPool,
}

impl PgScheduleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn get_by_id(&self, id: Id) -> AppResult<Schedule> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            "SELECT id, user_id, title, created_at FROM schedules WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Schedule::from).ok_or(AppError::NotFound)
    }

    async fn create(&self, schedule: ScheduleCreate) -> AppResult<Schedule> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            INSERT INTO schedules (user_id, title, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, created_at
            "#,
        )
        .bind(schedule.user_id)
        .bind(&schedule.title)
        .bind(schedule.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn list_by_user(&self, user_id: Id) -> AppResult<Vec<Schedule>> {
        let rows = sqlx::query_as::<_, ScheduleRow>(
            "SELECT id, user_id, title, created_at FROM schedules WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }
}

// ---- Classes ----

const CLASS_COLUMNS: &str = "id, schedule_id, title, teacher, room, weekday, number, parity";

#[derive(Debug, FromRow)]
pub struct ClassRow {
    pub id: i64,
    pub schedule_id: i64,
    pub title: String,
    pub teacher: Option<String>,
    pub room: Option<String>,
    pub weekday: i16,
    pub number: i16,
    pub parity: String,
}

impl TryFrom<ClassRow> for Class {
    type Error = AppError;

    fn try_from(row: ClassRow) -> AppResult<Self> {
        let parity = Parity::parse(&row.parity)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown parity: {}", row.parity)))?;
        Ok(Class {
            id: row.id,
            schedule_id: row.schedule_id,
            title: row.title,
            teacher: row.teacher,
            room: row.room,
            weekday: row.weekday,
            number: row.number,
            parity,
        })
    }
}

fn into_classes(rows: Vec<ClassRow>) -> AppResult<Vec<Class>> {
    rows.into_iter().map(Class::try_from).collect()
}

#[derive(Clone)]
pub struct PgClassRepository {
    pool: DbPool,
}

impl PgClassRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Lock the schedule row so slot changes within one schedule are serialized.
async fn lock_schedule(tx: &mut Transaction<'_, Postgres>, schedule_id: Id) -> AppResult<()> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM schedules WHERE id = $1 FOR UPDATE")
        .bind(schedule_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(())
}

async fn write_class(tx: &mut Transaction<'_, Postgres>, class: &Class) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE classes
        SET title = $2, teacher = $3, room = $4, weekday = $5, number = $6, parity = $7
        WHERE id = $1
        "#,
    )
    .bind(class.id)
    .bind(&class.title)
    .bind(&class.teacher)
    .bind(&class.room)
    .bind(class.weekday)
    .bind(class.number)
    .bind(class.parity.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait]
impl ClassRepository for PgClassRepository {
    async fn get_by_id(&self, id: Id) -> AppResult<Class> {
        let row = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {} FROM classes WHERE id = $1",
            CLASS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(AppError::NotFound)?.try_into()
    }

    async fn get_all_views(&self, schedule_id: Id) -> AppResult<Vec<ClassView>> {
        let rows = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {} FROM classes WHERE schedule_id = $1 ORDER BY weekday, number, parity",
            CLASS_COLUMNS
        ))
        .bind(schedule_id)
        .fetch_all(&self.pool)
        .await?;
        into_classes(rows)
    }

    async fn create_or_split(&self, class: CreateClassDto) -> AppResult<Id> {
        let mut tx = self.pool.begin().await?;
        lock_schedule(&mut tx, class.schedule_id).await?;

        let slot = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {} FROM classes WHERE schedule_id = $1 AND weekday = $2 AND number = $3",
            CLASS_COLUMNS
        ))
        .bind(class.schedule_id)
        .bind(class.weekday)
        .bind(class.number)
        .fetch_all(&mut *tx)
        .await?;

        if let InsertPlan::Split { class_id, parity } = plan_insert(&into_classes(slot)?, &class)? {
            sqlx::query("UPDATE classes SET parity = $2 WHERE id = $1")
                .bind(class_id)
                .bind(parity.as_str())
                .execute(&mut *tx)
                .await?;
        }

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO classes (schedule_id, title, teacher, room, weekday, number, parity)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(class.schedule_id)
        .bind(&class.title)
        .bind(&class.teacher)
        .bind(&class.room)
        .bind(class.weekday)
        .bind(class.number)
        .bind(class.parity.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn update_or_switch(
        &self,
        id: Id,
        schedule_id: Id,
        update: UpdateClassDto,
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        lock_schedule(&mut tx, schedule_id).await?;

        let rows = sqlx::query_as::<_, ClassRow>(&format!(
            "SELECT {} FROM classes WHERE schedule_id = $1",
            CLASS_COLUMNS
        ))
        .bind(schedule_id)
        .fetch_all(&mut *tx)
        .await?;
        let classes = into_classes(rows)?;
        let current = classes
            .iter()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;

        match plan_update(current, &update, &classes)? {
            UpdatePlan::Update(updated) => write_class(&mut tx, &updated).await?,
            UpdatePlan::Switch { updated, displaced } => {
                write_class(&mut tx, &displaced).await?;
                write_class(&mut tx, &updated).await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Id) -> AppResult<()> {
        let r = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if r.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
