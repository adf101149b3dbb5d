// storefront-api/src/db.rs

//! Database pool setup and startup seeding.

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::Role;
use crate::services::auth_service;
use sqlx::PgPool;
use tracing::{info, instrument};

pub async fn connect(config: &AppConfig) -> Result<PgPool> {
  let pool = PgPool::connect(&config.database_url).await?;
  info!("Successfully connected to the database.");
  Ok(pool)
}

/// Inserts the configured bootstrap admin account if its email is absent.
#[instrument(name = "db::ensure_admin_user", skip_all)]
pub async fn ensure_admin_user(pool: &PgPool, config: &AppConfig) -> Result<()> {
  let email = config.admin_email.trim().to_lowercase();

  let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
    .bind(&email)
    .fetch_one(pool)
    .await?;
  if exists {
    return Ok(());
  }

  let password_hash = auth_service::hash_password(&config.admin_password)?;
  sqlx::query("INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) ON CONFLICT (email) DO NOTHING")
    .bind(config.admin_name.trim())
    .bind(&email)
    .bind(&password_hash)
    .bind(Role::Admin)
    .execute(pool)
    .await?;

  info!(admin_email = %email, "Bootstrap admin account created.");
  Ok(())
}
