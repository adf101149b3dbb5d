// storefront-api/src/state.rs
use crate::config::AppConfig;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub http_client: reqwest::Client,
  pub config: Arc<AppConfig>, // Share loaded config
}
