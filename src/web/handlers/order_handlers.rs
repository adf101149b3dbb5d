// storefront-api/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::pagination::PageQuery;
use crate::policy::{self, Action};
use crate::services::order_service::{self, AdminOrderQuery, PlaceOrderPayload};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
  pub status: String,
}

#[instrument(name = "handler::place_order", skip(app_state, user, payload), fields(user_id = %user.0.id))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: web::Json<PlaceOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let order = order_service::place_order(&app_state.db_pool, &user.0, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "success": true, "order": order })))
}

#[instrument(name = "handler::my_orders", skip(app_state, user, query), fields(user_id = %user.0.id))]
pub async fn my_orders_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
  let page = order_service::list_user_orders(&app_state.db_pool, user.0.id, query.into_inner()).await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orders": page.orders,
    "pagination": page.pagination,
  })))
}

#[instrument(name = "handler::get_order", skip(app_state, user, path), fields(user_id = %user.0.id, order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = order_service::get_order(&app_state.db_pool, path.into_inner(), &user.0).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}

#[instrument(name = "handler::all_orders", skip(app_state, user, query), fields(user_id = %user.0.id))]
pub async fn all_orders_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  query: web::Query<AdminOrderQuery>,
) -> Result<HttpResponse, AppError> {
  policy::require(&user.0, Action::ViewAllOrders)?;
  let page = order_service::list_all_orders(&app_state.db_pool, &query).await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orders": page.orders,
    "pagination": page.pagination,
  })))
}

#[instrument(name = "handler::update_order_status", skip(app_state, user, path, payload), fields(user_id = %user.0.id, order_id = %path.as_ref()))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<StatusPayload>,
) -> Result<HttpResponse, AppError> {
  policy::require(&user.0, Action::UpdateOrderStatus)?;
  let order = order_service::update_status(&app_state.db_pool, path.into_inner(), &payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}
