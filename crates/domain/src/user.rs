//! Users and role-based capabilities.

use common::CustomerId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// What a user is allowed to do, as a tagged variant rather than a
/// subclass hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Owns a cart and places orders.
    Customer,
    /// Manages the catalog (prices, stock, new titles).
    Admin,
}

impl Role {
    /// Returns true if this role may add books and change prices/stock.
    pub fn can_manage_catalog(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Returns true if this role owns a cart and may check out.
    pub fn can_own_cart(&self) -> bool {
        matches!(self, Role::Customer)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

/// A known user of the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// Creates a user, rejecting addresses that are not email-shaped.
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Result<Self, DomainError> {
        let email = email.into();
        let shaped = match email.split_once('@') {
            Some((local, host)) => !local.is_empty() && host.contains('.') && !host.starts_with('.'),
            None => false,
        };
        if !shaped {
            return Err(DomainError::InvalidEmail { email });
        }
        Ok(Self {
            id,
            name: name.into(),
            email,
            role,
        })
    }
}
