// storefront-api/src/web/handlers/ai_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::ai_service::{self, AskPayload};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::ai_ask", skip(app_state, user, payload), fields(user_id = %user.0.id))]
pub async fn ask_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: web::Json<AskPayload>,
) -> Result<HttpResponse, AppError> {
  let answer = ai_service::ask(&app_state, &payload).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "response": answer })))
}
