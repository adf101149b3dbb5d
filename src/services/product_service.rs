// storefront-api/src/services/product_service.rs

//! Catalog queries: search/filter/paginate products, distinct categories,
//! and the admin-only CRUD operations.

use crate::errors::{AppError, Result};
use crate::models::Product;
use crate::pagination::{PageQuery, Pagination};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
  pub search: Option<String>,
  pub category: Option<String>,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

impl CatalogQuery {
  fn page(&self) -> PageQuery {
    PageQuery {
      page: self.page,
      limit: self.limit,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ProductPayload {
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub category: String,
  pub stock: i32,
  pub image: Option<String>,
}

pub struct ProductPage {
  pub products: Vec<Product>,
  pub pagination: Pagination,
}

fn validate_payload(payload: &ProductPayload) -> Result<()> {
  if payload.name.trim().is_empty() {
    return Err(AppError::Validation("Product name is required.".to_string()));
  }
  if payload.category.trim().is_empty() {
    return Err(AppError::Validation("Product category is required.".to_string()));
  }
  if payload.price_cents < 0 {
    return Err(AppError::Validation("Price must be non-negative.".to_string()));
  }
  if payload.stock < 0 {
    return Err(AppError::Validation("Stock must be non-negative.".to_string()));
  }
  Ok(())
}

/// Lists products matching the optional search/category filters, newest first.
///
/// `search` matches name OR description case-insensitively (substring);
/// `category` is an exact match. `total` in the envelope counts all matches,
/// so a page past the end yields an empty list rather than an error.
#[instrument(name = "product_service::list_products", skip(pool))]
pub async fn list_products(pool: &PgPool, query: &CatalogQuery) -> Result<ProductPage> {
  let search_pattern = query
    .search
    .as_deref()
    .filter(|s| !s.is_empty())
    .map(|s| format!("%{}%", s));
  let category = query.category.as_deref().filter(|c| !c.is_empty());

  let filter_sql = "($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1) \
     AND ($2::text IS NULL OR category = $2)";

  let products: Vec<Product> = sqlx::query_as(&format!(
    "SELECT id, name, description, price_cents, category, stock, image, created_at, updated_at \
     FROM products WHERE {} ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    filter_sql
  ))
  .bind(&search_pattern)
  .bind(category)
  .bind(query.page().limit())
  .bind(query.page().offset())
  .fetch_all(pool)
  .await?;

  let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {}", filter_sql))
    .bind(&search_pattern)
    .bind(category)
    .fetch_one(pool)
    .await?;

  Ok(ProductPage {
    products,
    pagination: Pagination::new(query.page().page(), query.page().limit(), total),
  })
}

/// Returns the deduplicated, alphabetically sorted set of category labels.
#[instrument(name = "product_service::list_categories", skip(pool))]
pub async fn list_categories(pool: &PgPool) -> Result<Vec<String>> {
  let categories: Vec<String> = sqlx::query_scalar("SELECT DISTINCT category FROM products ORDER BY category ASC")
    .fetch_all(pool)
    .await?;
  Ok(categories)
}

#[instrument(name = "product_service::get_product", skip(pool), fields(product_id = %product_id))]
pub async fn get_product(pool: &PgPool, product_id: Uuid) -> Result<Product> {
  sqlx::query_as(
    "SELECT id, name, description, price_cents, category, stock, image, created_at, updated_at \
     FROM products WHERE id = $1",
  )
  .bind(product_id)
  .fetch_optional(pool)
  .await?
  .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[instrument(name = "product_service::create_product", skip(pool, payload), fields(name = %payload.name))]
pub async fn create_product(pool: &PgPool, payload: ProductPayload) -> Result<Product> {
  validate_payload(&payload)?;

  let product: Product = sqlx::query_as(
    "INSERT INTO products (name, description, price_cents, category, stock, image) \
     VALUES ($1, $2, $3, $4, $5, $6) \
     RETURNING id, name, description, price_cents, category, stock, image, created_at, updated_at",
  )
  .bind(payload.name.trim())
  .bind(&payload.description)
  .bind(payload.price_cents)
  .bind(payload.category.trim())
  .bind(payload.stock)
  .bind(&payload.image)
  .fetch_one(pool)
  .await?;

  info!(product_id = %product.id, "Product created.");
  Ok(product)
}

/// Full replace of the mutable fields; NotFound if the id is absent.
#[instrument(name = "product_service::update_product", skip(pool, payload), fields(product_id = %product_id))]
pub async fn update_product(pool: &PgPool, product_id: Uuid, payload: ProductPayload) -> Result<Product> {
  validate_payload(&payload)?;

  let product: Option<Product> = sqlx::query_as(
    "UPDATE products SET name = $2, description = $3, price_cents = $4, category = $5, stock = $6, image = $7, \
     updated_at = now() WHERE id = $1 \
     RETURNING id, name, description, price_cents, category, stock, image, created_at, updated_at",
  )
  .bind(product_id)
  .bind(payload.name.trim())
  .bind(&payload.description)
  .bind(payload.price_cents)
  .bind(payload.category.trim())
  .bind(payload.stock)
  .bind(&payload.image)
  .fetch_optional(pool)
  .await?;

  product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Deletes a product; historical order items keep their snapshots (the FK
/// nulls out `product_id`).
#[instrument(name = "product_service::delete_product", skip(pool), fields(product_id = %product_id))]
pub async fn delete_product(pool: &PgPool, product_id: Uuid) -> Result<()> {
  let result = sqlx::query("DELETE FROM products WHERE id = $1")
    .bind(product_id)
    .execute(pool)
    .await?;

  if result.rows_affected() == 0 {
    return Err(AppError::NotFound("Product not found".to_string()));
  }
  info!(product_id = %product_id, "Product deleted.");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn payload() -> ProductPayload {
    ProductPayload {
      name: "Widget".to_string(),
      description: Some("A fine widget".to_string()),
      price_cents: 1999,
      category: "Gadgets".to_string(),
      stock: 5,
      image: None,
    }
  }

  #[test]
  fn accepts_a_well_formed_payload() {
    assert!(validate_payload(&payload()).is_ok());
  }

  #[test]
  fn rejects_negative_price_and_stock() {
    let mut p = payload();
    p.price_cents = -1;
    assert!(matches!(validate_payload(&p), Err(AppError::Validation(_))));

    let mut p = payload();
    p.stock = -1;
    assert!(matches!(validate_payload(&p), Err(AppError::Validation(_))));
  }

  #[test]
  fn rejects_blank_name_and_category() {
    let mut p = payload();
    p.name = "  ".to_string();
    assert!(validate_payload(&p).is_err());

    let mut p = payload();
    p.category = String::new();
    assert!(validate_payload(&p).is_err());
  }

  #[test]
  fn zero_price_and_zero_stock_are_allowed() {
    let mut p = payload();
    p.price_cents = 0;
    p.stock = 0;
    assert!(validate_payload(&p).is_ok());
  }
}
