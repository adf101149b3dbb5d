// storefront-api/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::models::PublicUser;
use crate::services::auth_service::{self, LoginPayload, RegisterPayload};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::register", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let outcome = auth_service::register(&app_state.db_pool, payload.into_inner(), &app_state.config.jwt_secret).await?;

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "user": outcome.user,
    "token": outcome.token,
  })))
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(email = %payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let outcome = auth_service::login(&app_state.db_pool, payload.into_inner(), &app_state.config.jwt_secret).await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "user": outcome.user,
    "token": outcome.token,
  })))
}

#[instrument(name = "handler::me", skip_all, fields(user_id = %user.0.id))]
pub async fn me_handler(user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  let safe_user: PublicUser = user.0.into();
  Ok(HttpResponse::Ok().json(json!({ "success": true, "user": safe_user })))
}
