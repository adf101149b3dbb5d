// storefront-api/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::policy::{self, Action};
use crate::services::product_service::{self, CatalogQuery, ProductPayload};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[instrument(name = "handler::list_products", skip(app_state, query))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CatalogQuery>,
) -> Result<HttpResponse, AppError> {
  let page = product_service::list_products(&app_state.db_pool, &query).await?;

  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "products": page.products,
    "pagination": page.pagination,
  })))
}

#[instrument(name = "handler::list_categories", skip(app_state))]
pub async fn list_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let categories = product_service::list_categories(&app_state.db_pool).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "categories": categories })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = product_service::get_product(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "product": product })))
}

#[instrument(name = "handler::create_product", skip(app_state, user, payload), fields(user_id = %user.0.id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  policy::require(&user.0, Action::ManageProducts)?;
  let product = product_service::create_product(&app_state.db_pool, payload.into_inner()).await?;
  Ok(HttpResponse::Created().json(json!({ "success": true, "product": product })))
}

#[instrument(name = "handler::update_product", skip(app_state, user, path, payload), fields(user_id = %user.0.id, product_id = %path.as_ref()))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
  payload: web::Json<ProductPayload>,
) -> Result<HttpResponse, AppError> {
  policy::require(&user.0, Action::ManageProducts)?;
  let product = product_service::update_product(&app_state.db_pool, path.into_inner(), payload.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "product": product })))
}

#[instrument(name = "handler::delete_product", skip(app_state, user, path), fields(user_id = %user.0.id, product_id = %path.as_ref()))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  policy::require(&user.0, Action::ManageProducts)?;
  product_service::delete_product(&app_state.db_pool, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Product deleted" })))
}
