//! Authenticated user model and capability checks.
//!
//! Session handling lives outside this crate: the caller resolves the current
//! request to an `Option<User>` and hands it to each operation. Operations turn a
//! missing user into [`Error::Unauthenticated`] rather than redirecting themselves.

use crate::entities::user;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "Customer",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Customer" => Ok(Self::Customer),
            "Admin" => Ok(Self::Admin),
            other => Err(Error::InvalidData {
                message: format!("unknown role `{other}`"),
            }),
        }
    }
}

/// The signed-in user, as resolved by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    /// Saved shipping address
    pub address: Option<String>,
    /// Saved telephone number
    pub tel: Option<String>,
}

impl TryFrom<user::Model> for User {
    type Error = Error;

    fn try_from(model: user::Model) -> Result<Self> {
        Ok(Self {
            role: model.role.parse()?,
            id: model.id,
            address: model.address,
            tel: model.tel,
        })
    }
}

/// Customers manage their own cart.
#[must_use]
pub fn can_update_user_cart(user: &User) -> bool {
    user.role == Role::Customer
}

/// Customers place orders.
#[must_use]
pub fn can_create_order(user: &User) -> bool {
    user.role == Role::Customer
}

/// Admins maintain the catalog.
#[must_use]
pub fn can_create_product(user: &User) -> bool {
    user.role == Role::Admin
}

/// Admins move orders through fulfilment.
#[must_use]
pub fn can_manage_orders(user: &User) -> bool {
    user.role == Role::Admin
}

/// Resolves the caller and checks one capability.
///
/// # Errors
/// `Unauthenticated` when there is no user, `Forbidden` when the capability fails.
pub fn authorize(user: Option<&User>, capability: fn(&User) -> bool) -> Result<&User> {
    let user = user.ok_or(Error::Unauthenticated)?;
    if capability(user) {
        Ok(user)
    } else {
        Err(Error::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u1".to_string(),
            role,
            address: None,
            tel: None,
        }
    }

    #[test]
    fn test_authorize_distinguishes_missing_and_forbidden() {
        assert!(matches!(
            authorize(None, can_create_order),
            Err(Error::Unauthenticated)
        ));

        let admin = user(Role::Admin);
        assert!(matches!(
            authorize(Some(&admin), can_update_user_cart),
            Err(Error::Forbidden)
        ));
        assert!(authorize(Some(&admin), can_create_product).is_ok());

        let customer = user(Role::Customer);
        assert!(authorize(Some(&customer), can_create_order).is_ok());
        assert!(authorize(Some(&customer), can_manage_orders).is_err());
    }

    #[test]
    fn test_role_round_trips_through_storage_name() {
        for role in [Role::Customer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().ok(), Some(role));
        }
        assert!(matches!(
            "Guest".parse::<Role>(),
            Err(Error::InvalidData { .. })
        ));
    }
}
