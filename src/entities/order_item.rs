//! Order item entity - Immutable snapshot of one purchased line.
//!
//! Title and image are copied as plain strings and `product_id` carries no foreign
//! key, so editing or deleting the product leaves order history untouched.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Units purchased
    pub quantity: i32,
    /// Unit price at time of purchase, in satang
    pub unit_price: i64,
    /// Line total in satang
    pub line_total: i64,
    /// Product title at time of purchase
    pub product_title: String,
    /// Main image URL at time of purchase
    pub product_image: Option<String>,
    /// Source product, kept for reference only
    pub product_id: Option<String>,
    pub order_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
