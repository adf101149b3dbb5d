// storefront-api/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Insufficient stock for {0}")]
  InsufficientStock(String),

  #[error("{0}")]
  Upstream(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

// Allow anyhow::Error to be converted into AppError::Internal for convenience
// in code that uses `?` on functions returning anyhow::Result.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    if err.is::<sqlx::Error>() {
      return AppError::Sqlx(err.downcast::<sqlx::Error>().unwrap());
    }
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response.
    tracing::error!(application_error = %self, "Responding with error");
    let body = |m: &str| json!({ "success": false, "message": m });
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(body(m)),
      AppError::Unauthorized(m) => HttpResponse::Unauthorized().json(body(m)),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(body(m)),
      AppError::NotFound(m) => HttpResponse::NotFound().json(body(m)),
      AppError::Conflict(m) => HttpResponse::Conflict().json(body(m)),
      AppError::InsufficientStock(_) => HttpResponse::BadRequest().json(body(&self.to_string())),
      AppError::Upstream(m) => HttpResponse::BadGateway().json(body(m)),
      AppError::Config(_) => HttpResponse::InternalServerError().json(body("Configuration issue")),
      AppError::Sqlx(_) => HttpResponse::InternalServerError().json(body("Database operation failed")),
      AppError::Internal(_) => HttpResponse::InternalServerError().json(body("An internal error occurred")),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
