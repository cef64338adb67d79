//! Product entity - The authoritative stock and price record for an item.
//!
//! `stock` and `sold` are only changed by checkout and by admin product edits.
//! Prices are stored in satang (1/100 baht) so totals never drift.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// UUID of the product; the first eight characters form the display SKU
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Product title shown in the catalog
    pub title: String,
    /// Long description
    pub description: String,
    /// Current selling price in satang
    pub price: i64,
    /// Purchase cost in satang, if recorded
    pub cost: Option<i64>,
    /// Units available for sale, never negative
    pub stock: i32,
    /// Cumulative units sold
    pub sold: i32,
    /// `"Active"` or `"Inactive"`
    pub status: String,
    /// Category this product is listed under
    pub category_id: String,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// One product has many images
    #[sea_orm(has_many = "super::product_image::Entity")]
    Images,
    /// One product appears in many cart lines
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::product_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
