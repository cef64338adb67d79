//! Order entity - The historical record of a completed checkout.
//!
//! Monetary fields are written once at checkout. Only `status`, `tracking_number`
//! and `updated_at` change afterwards. Orders are never deleted.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// UUID of the order
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Human-readable order number, e.g. `ORD-20261019143000-3FA9C1`
    #[sea_orm(unique)]
    pub order_number: String,
    /// Cart total plus shipping fee, in satang
    pub total_amount: i64,
    /// Shipping fee in satang
    pub shipping_fee: i64,
    /// Lifecycle status name, see `core::order::OrderStatus`
    pub status: String,
    /// Shipping address snapshot
    pub address: String,
    /// Contact phone snapshot
    pub phone: String,
    /// Optional customer note
    pub note: Option<String>,
    /// Carrier tracking number once shipped
    pub tracking_number: Option<String>,
    /// Customer who placed the order
    pub customer_id: String,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the status or tracking number last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order belongs to one customer
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CustomerId",
        to = "super::user::Column::Id"
    )]
    Customer,
    /// One order has many items
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
