// storefront-api/src/web/handlers/mod.rs

// Declare handler modules
pub mod ai_handlers;
pub mod auth_handlers;
pub mod order_handlers;
pub mod product_handlers;
