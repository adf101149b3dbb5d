// storefront-api/src/services/order_service.rs

//! Order placement and order queries.
//!
//! Placement runs inside a single transaction: every stock decrement is an
//! atomic conditional update (`stock = stock - q ... WHERE stock >= q`), so a
//! failure on any line item rolls back the whole order and two concurrent
//! orders can never oversell a product.

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus, Product, User};
use crate::pagination::{PageQuery, Pagination};
use crate::policy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// --- Request payloads ---

#[derive(Debug, Deserialize)]
pub struct OrderItemPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
  pub street: String,
  pub city: String,
  pub state: String,
  pub zip: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderPayload {
  pub items: Vec<OrderItemPayload>,
  pub shipping_address: ShippingAddress,
}

#[derive(Debug, Deserialize)]
pub struct AdminOrderQuery {
  pub status: Option<String>,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

// --- Response shapes (read-side joins, not stored denormalization) ---

#[derive(Debug, Clone, Serialize)]
pub struct OrderItemView {
  pub product_id: Option<Uuid>,
  pub name: String,
  pub image: Option<String>,
  pub quantity: i32,
  pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderUserView {
  pub id: Uuid,
  pub name: String,
  pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
  pub id: Uuid,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user: Option<OrderUserView>,
  pub items: Vec<OrderItemView>,
  pub total_amount_cents: i64,
  pub shipping_address: ShippingAddress,
  pub status: OrderStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

pub struct OrderPage {
  pub orders: Vec<OrderView>,
  pub pagination: Pagination,
}

impl OrderView {
  fn from_order(order: Order, user: Option<OrderUserView>, items: Vec<OrderItemView>) -> Self {
    Self {
      id: order.id,
      user,
      items,
      total_amount_cents: order.total_amount_cents,
      shipping_address: ShippingAddress {
        street: order.ship_street,
        city: order.ship_city,
        state: order.ship_state,
        zip: order.ship_zip,
      },
      status: order.status,
      created_at: order.created_at,
      updated_at: order.updated_at,
    }
  }
}

// --- Validation helpers ---

fn validate_items(items: &[OrderItemPayload]) -> Result<()> {
  if items.is_empty() {
    return Err(AppError::Validation("Order must have at least one item".to_string()));
  }
  for item in items {
    if item.quantity < 1 {
      return Err(AppError::Validation(format!(
        "Quantity for product {} must be at least 1",
        item.product_id
      )));
    }
  }
  Ok(())
}

fn validate_shipping(address: &ShippingAddress) -> Result<()> {
  let fields = [
    ("street", &address.street),
    ("city", &address.city),
    ("state", &address.state),
    ("zip", &address.zip),
  ];
  for (label, value) in fields {
    if value.trim().is_empty() {
      return Err(AppError::Validation(format!("Shipping address {} is required", label)));
    }
  }
  Ok(())
}

fn order_total_cents(lines: &[(i64, i32)]) -> i64 {
  lines.iter().map(|(price, qty)| price * i64::from(*qty)).sum()
}

// --- Operations ---

/// Places an order: checks and decrements stock per line item, snapshots each
/// product's name and price, and persists the order with its computed total.
///
/// All stock effects are applied atomically; NotFound or InsufficientStock on
/// any item leaves every product's stock untouched.
#[instrument(name = "order_service::place_order", skip(pool, user, payload), fields(user_id = %user.id, item_count = payload.items.len()))]
pub async fn place_order(pool: &PgPool, user: &User, payload: PlaceOrderPayload) -> Result<OrderView> {
  validate_items(&payload.items)?;
  validate_shipping(&payload.shipping_address)?;

  let mut tx = pool.begin().await?;
  let mut lines: Vec<(Product, i32)> = Vec::with_capacity(payload.items.len());

  for item in &payload.items {
    let product: Option<Product> = sqlx::query_as(
      "SELECT id, name, description, price_cents, category, stock, image, created_at, updated_at \
       FROM products WHERE id = $1",
    )
    .bind(item.product_id)
    .fetch_optional(&mut *tx)
    .await?;

    let product = product.ok_or_else(|| AppError::NotFound(format!("Product {} not found", item.product_id)))?;

    // Atomic conditional decrement: succeeds only if enough stock remains.
    let decremented = sqlx::query(
      "UPDATE products SET stock = stock - $2, updated_at = now() WHERE id = $1 AND stock >= $2",
    )
    .bind(item.product_id)
    .bind(item.quantity)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if decremented == 0 {
      warn!(product_id = %product.id, requested = item.quantity, "Insufficient stock for order line.");
      return Err(AppError::InsufficientStock(product.name));
    }

    lines.push((product, item.quantity));
  }

  let totals: Vec<(i64, i32)> = lines.iter().map(|(p, q)| (p.price_cents, *q)).collect();
  let total = order_total_cents(&totals);

  let order: Order = sqlx::query_as(
    "INSERT INTO orders (user_id, status, total_amount_cents, ship_street, ship_city, ship_state, ship_zip) \
     VALUES ($1, $2, $3, $4, $5, $6, $7) \
     RETURNING id, user_id, status, total_amount_cents, ship_street, ship_city, ship_state, ship_zip, created_at, updated_at",
  )
  .bind(user.id)
  .bind(OrderStatus::Pending)
  .bind(total)
  .bind(payload.shipping_address.street.trim())
  .bind(payload.shipping_address.city.trim())
  .bind(payload.shipping_address.state.trim())
  .bind(payload.shipping_address.zip.trim())
  .fetch_one(&mut *tx)
  .await?;

  for (product, quantity) in &lines {
    sqlx::query(
      "INSERT INTO order_items (order_id, product_id, product_name, quantity, price_cents) \
       VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(order.id)
    .bind(product.id)
    .bind(&product.name)
    .bind(quantity)
    .bind(product.price_cents)
    .execute(&mut *tx)
    .await?;
  }

  tx.commit().await?;
  info!(order_id = %order.id, total_amount_cents = total, "Order placed.");

  let items = lines
    .into_iter()
    .map(|(product, quantity)| OrderItemView {
      product_id: Some(product.id),
      name: product.name,
      image: product.image,
      quantity,
      price_cents: product.price_cents,
    })
    .collect();

  let user_view = OrderUserView {
    id: user.id,
    name: user.name.clone(),
    email: user.email.clone(),
  };
  Ok(OrderView::from_order(order, Some(user_view), items))
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
  order_id: Uuid,
  product_id: Option<Uuid>,
  product_name: String,
  quantity: i32,
  price_cents: i64,
  image: Option<String>,
}

/// Loads the line items for a set of orders, resolving each product's image
/// through a LEFT JOIN so items of deleted products still render from their
/// snapshots.
async fn load_items(pool: &PgPool, order_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<OrderItemView>>> {
  if order_ids.is_empty() {
    return Ok(HashMap::new());
  }

  let rows: Vec<OrderItemRow> = sqlx::query_as(
    "SELECT oi.order_id, oi.product_id, oi.product_name, oi.quantity, oi.price_cents, p.image \
     FROM order_items oi LEFT JOIN products p ON p.id = oi.product_id \
     WHERE oi.order_id = ANY($1) ORDER BY oi.id ASC",
  )
  .bind(order_ids)
  .fetch_all(pool)
  .await?;

  let mut by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
  for row in rows {
    by_order.entry(row.order_id).or_default().push(OrderItemView {
      product_id: row.product_id,
      name: row.product_name,
      image: row.image,
      quantity: row.quantity,
      price_cents: row.price_cents,
    });
  }
  Ok(by_order)
}

#[derive(Debug, FromRow)]
struct OrderWithUserRow {
  id: Uuid,
  user_id: Uuid,
  status: OrderStatus,
  total_amount_cents: i64,
  ship_street: String,
  ship_city: String,
  ship_state: String,
  ship_zip: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
  user_name: String,
  user_email: String,
}

impl OrderWithUserRow {
  fn split(self) -> (Order, OrderUserView) {
    let user = OrderUserView {
      id: self.user_id,
      name: self.user_name,
      email: self.user_email,
    };
    let order = Order {
      id: self.id,
      user_id: self.user_id,
      status: self.status,
      total_amount_cents: self.total_amount_cents,
      ship_street: self.ship_street,
      ship_city: self.ship_city,
      ship_state: self.ship_state,
      ship_zip: self.ship_zip,
      created_at: self.created_at,
      updated_at: self.updated_at,
    };
    (order, user)
  }
}

const ORDER_WITH_USER_SELECT: &str =
  "SELECT o.id, o.user_id, o.status, o.total_amount_cents, o.ship_street, o.ship_city, o.ship_state, o.ship_zip, \
   o.created_at, o.updated_at, u.name AS user_name, u.email AS user_email \
   FROM orders o JOIN users u ON u.id = o.user_id";

/// Lists the requester's own orders, newest first.
#[instrument(name = "order_service::list_user_orders", skip(pool))]
pub async fn list_user_orders(pool: &PgPool, user_id: Uuid, page: PageQuery) -> Result<OrderPage> {
  let orders: Vec<Order> = sqlx::query_as(
    "SELECT id, user_id, status, total_amount_cents, ship_street, ship_city, ship_state, ship_zip, \
     created_at, updated_at FROM orders WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
  )
  .bind(user_id)
  .bind(page.limit())
  .bind(page.offset())
  .fetch_all(pool)
  .await?;

  let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
    .bind(user_id)
    .fetch_one(pool)
    .await?;

  let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
  let mut items = load_items(pool, &order_ids).await?;

  let views = orders
    .into_iter()
    .map(|order| {
      let order_items = items.remove(&order.id).unwrap_or_default();
      OrderView::from_order(order, None, order_items)
    })
    .collect();

  Ok(OrderPage {
    orders: views,
    pagination: Pagination::new(page.page(), page.limit(), total),
  })
}

/// Fetches a single order. Owners see their own orders; admins see any.
#[instrument(name = "order_service::get_order", skip(pool, requester), fields(order_id = %order_id, requester_id = %requester.id))]
pub async fn get_order(pool: &PgPool, order_id: Uuid, requester: &User) -> Result<OrderView> {
  let row: Option<OrderWithUserRow> = sqlx::query_as(&format!("{} WHERE o.id = $1", ORDER_WITH_USER_SELECT))
    .bind(order_id)
    .fetch_optional(pool)
    .await?;

  let row = row.ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
  let (order, user_view) = row.split();

  if !policy::can_view_order(requester, order.user_id) {
    warn!("Order access denied.");
    return Err(AppError::Forbidden("Access denied".to_string()));
  }

  let mut items = load_items(pool, &[order.id]).await?;
  let order_items = items.remove(&order.id).unwrap_or_default();
  Ok(OrderView::from_order(order, Some(user_view), order_items))
}

/// Lists every order (admin), optionally filtered by exact status.
#[instrument(name = "order_service::list_all_orders", skip(pool))]
pub async fn list_all_orders(pool: &PgPool, query: &AdminOrderQuery) -> Result<OrderPage> {
  let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
    Some(s) => Some(
      OrderStatus::from_str(s).map_err(|_| AppError::Validation("Invalid order status".to_string()))?,
    ),
    None => None,
  };
  let page = PageQuery {
    page: query.page,
    limit: query.limit,
  };

  let rows: Vec<OrderWithUserRow> = sqlx::query_as(&format!(
    "{} WHERE ($1::order_status_enum IS NULL OR o.status = $1) ORDER BY o.created_at DESC LIMIT $2 OFFSET $3",
    ORDER_WITH_USER_SELECT
  ))
  .bind(status)
  .bind(page.limit())
  .bind(page.offset())
  .fetch_all(pool)
  .await?;

  let total: i64 =
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE ($1::order_status_enum IS NULL OR status = $1)")
      .bind(status)
      .fetch_one(pool)
      .await?;

  let order_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
  let mut items = load_items(pool, &order_ids).await?;

  let views = rows
    .into_iter()
    .map(|row| {
      let (order, user_view) = row.split();
      let order_items = items.remove(&order.id).unwrap_or_default();
      OrderView::from_order(order, Some(user_view), order_items)
    })
    .collect();

  Ok(OrderPage {
    orders: views,
    pagination: Pagination::new(page.page(), page.limit(), total),
  })
}

/// Replaces an order's status (admin). Any status may move to any other;
/// re-applying the current status is a no-op success.
#[instrument(name = "order_service::update_status", skip(pool), fields(order_id = %order_id, new_status = %new_status))]
pub async fn update_status(pool: &PgPool, order_id: Uuid, new_status: &str) -> Result<OrderView> {
  let status =
    OrderStatus::from_str(new_status).map_err(|_| AppError::Validation("Invalid order status".to_string()))?;

  let updated = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
    .bind(order_id)
    .bind(status)
    .execute(pool)
    .await?
    .rows_affected();

  if updated == 0 {
    return Err(AppError::NotFound("Order not found".to_string()));
  }
  info!("Order status updated.");

  let row: OrderWithUserRow = sqlx::query_as(&format!("{} WHERE o.id = $1", ORDER_WITH_USER_SELECT))
    .bind(order_id)
    .fetch_one(pool)
    .await?;
  let (order, user_view) = row.split();

  let mut items = load_items(pool, &[order.id]).await?;
  let order_items = items.remove(&order.id).unwrap_or_default();
  Ok(OrderView::from_order(order, Some(user_view), order_items))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(quantity: i32) -> OrderItemPayload {
    OrderItemPayload {
      product_id: Uuid::new_v4(),
      quantity,
    }
  }

  fn address() -> ShippingAddress {
    ShippingAddress {
      street: "1 Main St".to_string(),
      city: "Springfield".to_string(),
      state: "IL".to_string(),
      zip: "62701".to_string(),
    }
  }

  #[test]
  fn empty_cart_is_rejected() {
    assert!(matches!(validate_items(&[]), Err(AppError::Validation(_))));
  }

  #[test]
  fn zero_and_negative_quantities_are_rejected() {
    assert!(validate_items(&[item(0)]).is_err());
    assert!(validate_items(&[item(-3)]).is_err());
    assert!(validate_items(&[item(1), item(0)]).is_err());
  }

  #[test]
  fn positive_quantities_are_accepted() {
    assert!(validate_items(&[item(1), item(42)]).is_ok());
  }

  #[test]
  fn shipping_address_requires_every_field() {
    assert!(validate_shipping(&address()).is_ok());

    let mut a = address();
    a.zip = "   ".to_string();
    assert!(matches!(validate_shipping(&a), Err(AppError::Validation(_))));

    let mut a = address();
    a.city = String::new();
    assert!(validate_shipping(&a).is_err());
  }

  #[test]
  fn total_is_sum_of_quantity_times_price() {
    // 3 x $4.00 + 2 x $10.50 = $33.00
    assert_eq!(order_total_cents(&[(400, 3), (1050, 2)]), 3300);
    assert_eq!(order_total_cents(&[]), 0);
  }
}
