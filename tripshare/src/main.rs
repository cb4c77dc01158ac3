// tripshare/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use tripshare::{AppConfig, AppState, Collaborators};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting tripshare server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let db_pool = match PgPool::connect(&app_config.database_url).await {
    Ok(pool) => {
      tracing::info!("Successfully connected to the database.");
      pool
    }
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()));
    }
  };

  if app_config.run_migrations {
    if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
      tracing::error!(error = %e, "Database migration failed.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
    tracing::info!("Database migrations applied.");
  }

  let collaborators = Collaborators::production(&app_config, db_pool);
  let app_state = AppState::new(app_config.clone(), collaborators);
  tracing::info!("Pipelines registered.");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(tripshare::web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
