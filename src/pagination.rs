// storefront-api/src/pagination.rs

//! Shared pagination contract for every list endpoint.

use serde::{Deserialize, Serialize};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Query-string parameters accepted by paginated endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

impl PageQuery {
  /// Normalized page number, clamped to at least 1.
  pub fn page(&self) -> i64 {
    self.page.unwrap_or(DEFAULT_PAGE).max(1)
  }

  /// Normalized page size, clamped to 1..=MAX_LIMIT.
  pub fn limit(&self) -> i64 {
    self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
  }

  /// Rows to skip: `(page - 1) * limit`.
  pub fn offset(&self) -> i64 {
    (self.page() - 1) * self.limit()
  }
}

/// The `{page, limit, total, pages}` envelope returned alongside list results.
/// `total` counts all matches ignoring skip/limit; `pages = ceil(total / limit)`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Pagination {
  pub page: i64,
  pub limit: i64,
  pub total: i64,
  pub pages: i64,
}

impl Pagination {
  pub fn new(page: i64, limit: i64, total: i64) -> Self {
    let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
    Self { page, limit, total, pages }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn query(page: Option<i64>, limit: Option<i64>) -> PageQuery {
    PageQuery { page, limit }
  }

  #[test]
  fn defaults_to_first_page_of_ten() {
    let q = query(None, None);
    assert_eq!(q.page(), 1);
    assert_eq!(q.limit(), 10);
    assert_eq!(q.offset(), 0);
  }

  #[test]
  fn offset_skips_previous_pages() {
    let q = query(Some(3), Some(25));
    assert_eq!(q.offset(), 50);
  }

  #[test]
  fn clamps_degenerate_inputs() {
    assert_eq!(query(Some(0), None).page(), 1);
    assert_eq!(query(Some(-5), None).page(), 1);
    assert_eq!(query(None, Some(0)).limit(), 1);
    assert_eq!(query(None, Some(100_000)).limit(), MAX_LIMIT);
  }

  #[test]
  fn pages_is_ceiling_of_total_over_limit() {
    assert_eq!(Pagination::new(1, 10, 0).pages, 0);
    assert_eq!(Pagination::new(1, 10, 1).pages, 1);
    assert_eq!(Pagination::new(1, 10, 10).pages, 1);
    assert_eq!(Pagination::new(1, 10, 11).pages, 2);
    assert_eq!(Pagination::new(1, 3, 7).pages, 3);
  }
}
