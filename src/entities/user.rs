//! User entity - A storefront account as resolved by the authentication layer.
//!
//! Customers own one cart and any number of orders. The stored address and
//! telephone number can be reused at checkout.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// UUID of the user
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email, unique across accounts
    #[sea_orm(unique)]
    pub email: String,
    /// Role name: `"Customer"` or `"Admin"`
    pub role: String,
    /// Saved shipping address
    pub address: Option<String>,
    /// Saved telephone number
    pub tel: Option<String>,
    /// When the account was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has at most one cart
    #[sea_orm(has_many = "super::cart::Entity")]
    Cart,
    /// One user has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
