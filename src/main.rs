//! Entry point: load config, wire dependencies, and run the server.

use std::sync::Arc;

use chrono::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uni_schedule::auth::HmacJwtManager;
use uni_schedule::config::Config;
use uni_schedule::db::{self, PgClassRepository, PgScheduleRepository, PgTokenRepository, PgUserRepository};
use uni_schedule::services::{AuthService, ClassService, ScheduleService};
use uni_schedule::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    tracing::info!("migrations applied");

    let jwt = Arc::new(HmacJwtManager::new(
        config.jwt_access_secret.clone(),
        config.jwt_refresh_secret.clone(),
        Duration::minutes(config.access_token_ttl_minutes),
        Duration::days(config.refresh_token_ttl_days),
    ));
    let schedule_repo = Arc::new(PgScheduleRepository::new(db_pool.clone()));

    let auth_service = AuthService::new(
        Arc::new(PgUserRepository::new(db_pool.clone())),
        Arc::new(PgTokenRepository::new(db_pool.clone())),
        jwt,
        config.password_salt.clone(),
    );
    let schedule_service = ScheduleService::new(schedule_repo.clone());
    let class_service = ClassService::new(Arc::new(PgClassRepository::new(db_pool)), schedule_repo);

    let state = AppState {
        auth_service,
        schedule_service,
        class_service,
    };

    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
