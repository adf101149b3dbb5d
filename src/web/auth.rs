// storefront-api/src/web/auth.rs

//! Bearer-token authentication as an Actix extractor. Handlers that take an
//! `AuthenticatedUser` argument reject unauthenticated requests before any
//! business logic runs.

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use actix_web::http::header;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

pub struct AuthenticatedUser(pub crate::models::User);

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
  let header_value = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))?;

  header_value
    .strip_prefix("Bearer ")
    .filter(|t| !t.is_empty())
    .map(str::to_string)
    .ok_or_else(|| AppError::Unauthorized("Missing authorization token".to_string()))
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let req = req.clone();
    Box::pin(async move {
      let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("Application state not configured".to_string()))?
        .clone();

      let token = bearer_token(&req)?;
      let user_id = auth_service::decode_token(&token, &state.config.jwt_secret)?;
      let user = auth_service::fetch_user(&state.db_pool, user_id).await?;
      Ok(AuthenticatedUser(user))
    })
  }
}
