//! Database configuration module.
//!
//! This module handles the database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without handwritten SQL.

use crate::entities::{
    Cart, CartItem, Category, Order, OrderItem, Product, ProductImage, User, cart_item,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema, sea_query::Index};
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory holding the file of a `SQLite` URL, when it names a file in a
/// subdirectory. Other backends and in-memory databases have none.
#[must_use]
pub fn sqlite_file_dir(database_url: &str) -> Option<&Path> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file.starts_with(":memory:") {
        return None;
    }
    Path::new(file)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by [`get_database_url`].
///
/// For a file-backed `SQLite` URL the file's directory is created first.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_file_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
        debug!("Ensured database directory {}", dir.display());
    }
    debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every storefront table from its entity definition.
///
/// Referenced tables are created before the tables pointing at them. A cart holds
/// at most one line per product, enforced by a unique index on
/// `cart_items (cart_id, product_id)`.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tables = [
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(ProductImage),
        schema.create_table_from_entity(Cart),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
    ];

    for table in &mut tables {
        table.if_not_exists();
        db.execute(builder.build(&*table)).await?;
    }

    let cart_line_index = Index::create()
        .name("idx_cart_items_cart_product")
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&cart_line_index)).await?;

    info!("Database tables ensured.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        CartItemModel, CartModel, CategoryModel, OrderItemModel, OrderModel, ProductImageModel,
        ProductModel, UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<CategoryModel> = Category::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<ProductImageModel> = ProductImage::find().limit(1).all(&db).await?;
        let _: Vec<CartModel> = Cart::find().limit(1).all(&db).await?;
        let _: Vec<CartItemModel> = CartItem::find().limit(1).all(&db).await?;
        let _: Vec<OrderModel> = Order::find().limit(1).all(&db).await?;
        let _: Vec<OrderItemModel> = OrderItem::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_file_dir() {
        assert_eq!(sqlite_file_dir(DEFAULT_DATABASE_URL), Some(Path::new("data")));
        assert_eq!(
            sqlite_file_dir("sqlite:///var/lib/shop/store.db?mode=rwc"),
            Some(Path::new("/var/lib/shop"))
        );
        assert_eq!(sqlite_file_dir("sqlite://store.db?mode=rwc"), None);
        assert_eq!(sqlite_file_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_file_dir("postgres://shop@localhost/shop"), None);
    }
}
