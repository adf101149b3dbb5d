// storefront-api/src/policy.rs

//! Capability checks, centralized so handlers don't duplicate role string
//! comparisons.

use crate::errors::{AppError, Result};
use crate::models::{Role, User};
use uuid::Uuid;

/// Actions gated behind the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  ManageProducts,
  ViewAllOrders,
  UpdateOrderStatus,
}

pub fn allows(user: &User, _action: Action) -> bool {
  // Every currently defined action is admin-only.
  user.role == Role::Admin
}

pub fn require(user: &User, action: Action) -> Result<()> {
  if allows(user, action) {
    Ok(())
  } else {
    Err(AppError::Forbidden("Access denied".to_string()))
  }
}

/// Users may view their own orders; admins may view any order.
pub fn can_view_order(user: &User, order_owner: Uuid) -> bool {
  user.role == Role::Admin || user.id == order_owner
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn user_with_role(role: Role) -> User {
    User {
      id: Uuid::new_v4(),
      name: "Test".to_string(),
      email: "test@example.com".to_string(),
      password_hash: "x".to_string(),
      role,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn admin_actions_require_admin_role() {
    let admin = user_with_role(Role::Admin);
    let customer = user_with_role(Role::User);
    for action in [Action::ManageProducts, Action::ViewAllOrders, Action::UpdateOrderStatus] {
      assert!(require(&admin, action).is_ok());
      assert!(matches!(require(&customer, action), Err(AppError::Forbidden(_))));
    }
  }

  #[test]
  fn order_visibility_is_owner_or_admin() {
    let admin = user_with_role(Role::Admin);
    let owner = user_with_role(Role::User);
    let stranger = user_with_role(Role::User);

    assert!(can_view_order(&owner, owner.id));
    assert!(can_view_order(&admin, owner.id));
    assert!(!can_view_order(&stranger, owner.id));
  }
}
