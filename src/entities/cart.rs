//! Cart entity - The single mutable shopping cart of a user.
//!
//! `total` is a cached sum of the line totals of its items and is rewritten after
//! every cart mutation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    /// UUID of the cart
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Owning user; one cart per user
    #[sea_orm(unique)]
    pub user_id: String,
    /// Cached cart total in satang
    pub total: i64,
    /// When the cart was first created
    pub created_at: DateTimeUtc,
    /// When the cart total was last rewritten
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Cart and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each cart belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// One cart has many items
    #[sea_orm(has_many = "super::cart_item::Entity")]
    Items,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
