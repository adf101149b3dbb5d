// storefront-api/src/services/mod.rs

//! Domain services. Handlers stay thin; everything with business meaning
//! lives here.

pub mod ai_service;
pub mod auth_service;
pub mod order_service;
pub mod product_service;
