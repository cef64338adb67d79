//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        auth::{Role, User},
        category,
        inventory::ListingStatus,
        money::Money,
        order::OrderStatus,
    },
    entities::{self, order, order_item, product, user},
    errors::Result,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

/// Installs a tracing subscriber that writes through the test harness.
/// Safe to call from every test; only the first call takes effect.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A signed-in user that has no row in the database.
/// Enough for capability checks and validation paths.
pub fn test_user(role: Role) -> User {
    User {
        id: Uuid::new_v4().to_string(),
        role,
        address: None,
        tel: None,
    }
}

/// Inserts a customer row and returns them as the signed-in user.
pub async fn create_test_customer(db: &DatabaseConnection, email: &str) -> Result<User> {
    let model = user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(email.split('@').next().unwrap_or(email).to_string()),
        email: Set(email.to_string()),
        role: Set(Role::Customer.as_str().to_string()),
        address: Set(None),
        tel: Set(None),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    User::try_from(model)
}

/// Creates a test database with one active category.
///
/// # Returns
/// Tuple of (database, category)
pub async fn setup_with_category() -> Result<(DatabaseConnection, entities::category::Model)> {
    let db = setup_test_db().await?;
    let category = category::create_category(&db, "Apparel", ListingStatus::Active).await?;
    Ok((db, category))
}

/// Creates a test product with custom parameters.
/// Use this when you need a specific price, stock or status.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    category_id: &str,
    title: &str,
    price_baht: i64,
    stock: i32,
    status: ListingStatus,
) -> Result<product::Model> {
    let now = chrono::Utc::now();
    product::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set(title.to_string()),
        description: Set(String::new()),
        price: Set(Money::from_baht(price_baht).satang()),
        cost: Set(None),
        stock: Set(stock),
        sold: Set(0),
        status: Set(status.as_str().to_string()),
        category_id: Set(category_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test database with a category and one active product.
///
/// # Returns
/// Tuple of (database, category, product)
///
/// # Example
/// ```ignore
/// let (db, category, product) = setup_with_product(100, 2).await?;
/// ```
pub async fn setup_with_product(
    price_baht: i64,
    stock: i32,
) -> Result<(
    DatabaseConnection,
    entities::category::Model,
    product::Model,
)> {
    let (db, category) = setup_with_category().await?;
    let product = create_custom_product(
        &db,
        &category.id,
        "Cotton T-Shirt",
        price_baht,
        stock,
        ListingStatus::Active,
    )
    .await?;
    Ok((db, category, product))
}

/// Inserts an order in `status` with a single 2 x 100 baht line and 50 baht shipping.
/// Bypasses checkout so order tests do not depend on cart state.
pub async fn create_test_order(
    db: &DatabaseConnection,
    customer_id: &str,
    status: OrderStatus,
) -> Result<order::Model> {
    let now = chrono::Utc::now();
    let order_id = Uuid::new_v4().to_string();
    let order = order::ActiveModel {
        id: Set(order_id.clone()),
        order_number: Set(format!("ORD-TEST-{}", &order_id[..8])),
        total_amount: Set(Money::from_baht(250).satang()),
        shipping_fee: Set(Money::from_baht(50).satang()),
        status: Set(status.as_str().to_string()),
        address: Set("1 Test Road, Bangkok".to_string()),
        phone: Set("0812345678".to_string()),
        note: Set(None),
        tracking_number: Set(None),
        customer_id: Set(customer_id.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    order_item::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        quantity: Set(2),
        unit_price: Set(Money::from_baht(100).satang()),
        line_total: Set(Money::from_baht(200).satang()),
        product_title: Set("Cotton T-Shirt".to_string()),
        product_image: Set(None),
        product_id: Set(None),
        order_id: Set(order.id.clone()),
    }
    .insert(db)
    .await?;

    Ok(order)
}
