// storefront-api/src/config.rs

use crate::errors::{AppError, Result}; // Use AppError specific Result
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  // Token signing
  pub jwt_secret: String,

  // CORS: the single allowed browser origin
  pub client_origin: String,

  // Bootstrap admin account, inserted at startup if absent
  pub admin_email: String,
  pub admin_password: String,
  pub admin_name: String,

  // Optional: AI assistant passthrough is disabled when unset
  pub gemini_api_key: Option<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "5000".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let jwt_secret = get_env("JWT_SECRET").unwrap_or_else(|_| "change-me".to_string());
    if jwt_secret == "change-me" {
      tracing::warn!("JWT_SECRET is not set or using the default value; tokens are not secure.");
    }

    let client_origin = get_env("CLIENT_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

    let admin_email = get_env("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password = get_env("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_name = get_env("ADMIN_NAME").unwrap_or_else(|_| "Admin User".to_string());

    let gemini_api_key = match get_env("GEMINI_API_KEY") {
      Ok(key) if !key.is_empty() => Some(key),
      _ => {
        tracing::warn!("GEMINI_API_KEY is not set. AI assistant features will be disabled.");
        None
      }
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      jwt_secret,
      client_origin,
      admin_email,
      admin_password,
      admin_name,
      gemini_api_key,
    })
  }
}
