// storefront-api/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod order;
pub mod product;
pub mod user;

// Re-export the model structs for convenient access
pub use order::{Order, OrderStatus};
pub use product::Product;
pub use user::{PublicUser, Role, User};
