// store_api/src/main.rs

use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

use store_api::config::{AppConfig, DatabaseConfig, LogFormat, LoggingConfig, StoreBackend};
use store_api::repository::{InMemoryStoreRepository, PgStoreRepository, StoreRepository};
use store_api::state::AppState;
use store_api::web::configure_app;

fn init_tracing(logging: &LoggingConfig) {
  // RUST_LOG wins over the configured level.
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // Log when spans close, showing duration
  match logging.format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn connect_repository(database: &DatabaseConfig) -> anyhow::Result<Arc<dyn StoreRepository>> {
  match database.backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on shutdown.");
      Ok(Arc::new(InMemoryStoreRepository::new()))
    }
    StoreBackend::Postgres => {
      let url = database.url.as_deref().context("database.url is not set")?;
      let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(database.acquire_timeout())
        .connect(url)
        .await
        .context("failed to connect to the database")?;
      tracing::info!("Successfully connected to the database.");

      if database.run_migrations {
        sqlx::migrate!("./migrations")
          .run(&pool)
          .await
          .context("failed to run database migrations")?;
        tracing::info!("Database migrations applied.");
      }
      Ok(Arc::new(PgStoreRepository::new(pool)))
    }
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // Configuration decides the log format, so it is read before tracing starts.
  let app_config = AppConfig::load().context("failed to load configuration")?;
  init_tracing(&app_config.logging);
  tracing::info!("Starting store API server...");

  let repository = connect_repository(&app_config.database).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to initialise the store.");
    e
  })?;

  let app_state = AppState::new(repository, &app_config);

  let server_address = app_config.server.host.clone();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .configure(configure_app(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
  })
  .bind(&server_address)
  .with_context(|| format!("failed to bind {}", server_address))?
  .run()
  .await
  .context("server terminated with an error")
}
