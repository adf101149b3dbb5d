// storefront-api/src/main.rs

// Declare modules for the application
mod config;
mod db;
mod errors;
mod models;
mod pagination;
mod policy;
mod services;
mod state;
mod web;

use crate::config::AppConfig;
use crate::state::AppState;

use actix_cors::Cors;
use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  // Initialize tracing subscriber for logging
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO) // Default level
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .init();

  tracing::info!("Starting storefront API server...");

  // Load application configuration
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  // Initialize Database Pool
  let db_pool = match db::connect(&app_config).await {
    Ok(pool) => pool,
    Err(e) => {
      tracing::error!(error = %e, "Failed to connect to the database.");
      panic!("Database connection error: {}", e);
    }
  };

  // Make sure the bootstrap admin account exists
  if let Err(e) = db::ensure_admin_user(&db_pool, &app_config).await {
    tracing::error!(error = %e, "Failed to ensure bootstrap admin account.");
  }

  // Outbound HTTP client for the AI assistant passthrough
  let http_client = reqwest::Client::new();

  // Create AppState
  let app_state = AppState {
    db_pool,
    http_client,
    config: app_config.clone(),
  };

  // Configure and Start Actix Web Server
  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  let client_origin = app_config.client_origin.clone();
  HttpServer::new(move || {
    let cors = Cors::default()
      .allowed_origin(&client_origin)
      .allow_any_method()
      .allow_any_header()
      .supports_credentials();

    App::new()
      .app_data(actix_data::Data::new(app_state.clone())) // Share AppState with handlers
      .wrap(cors)
      .wrap(tracing_actix_web::TracingLogger::default()) // Actix middleware for tracing requests
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
