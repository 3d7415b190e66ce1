use anyhow::{Context, Result};
use eventhub_api::{
    config::{AppConfig, Environment},
    create_router,
    error::redact_internal_errors,
    repository::Repositories,
    AppState, EventHubServices,
};
use eventhub_auth::AuthService;
use sqlx::postgres::PgPoolOptions;
use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger(Environment::from_env())?;
    bootstrap().await
}

fn init_logger(environment: Environment) -> Result<()> {
    let log_level = match environment {
        Environment::Development => "debug",
        Environment::Production => "info",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| log_level.into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

async fn bootstrap() -> Result<()> {
    let config = AppConfig::from_env().context("Invalid configuration")?;
    redact_internal_errors(config.environment.is_production());

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;
    tracing::info!("Connected to database");

    eventhub_auth::run_migrations(&pool)
        .await
        .context("Failed to run auth migrations")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    let repos = Repositories::postgres(pool);
    let auth = Arc::new(
        AuthService::new(repos.users.clone(), config.auth.clone())
            .context("Failed to initialize authentication")?,
    );
    let state = AppState::new(EventHubServices::new(repos, auth));

    let app = create_router(state, &config.cors_origins);

    let addr = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), config.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(environment = ?config.environment, "Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Unexpected error happened in server")
        .inspect_err(|e| {
            tracing::error!(
                error.cause_chain = ?e, error.message = %e, "Unexpected error"
            )
        })
}
