//! Product image entity - An uploaded picture of a product.
//!
//! Exactly one image per product is flagged `is_main` once the product has images.
//! `file_id` is the key used to delete the file from image storage.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product image database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Public URL of the image
    pub url: String,
    /// Storage key of the uploaded file
    pub file_id: String,
    /// Whether this is the product's display image
    pub is_main: bool,
    /// Display order within the product, ascending
    pub position: i32,
    pub product_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
