//! Category business logic - catalog grouping and first-run seeding.

use crate::{
    config::store::CategoryConfig,
    core::inventory::ListingStatus,
    entities::{Category, category},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info};
use uuid::Uuid;

/// Lists all categories ordered by name.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<category::Model>> {
    Category::find()
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads a category that products may be listed under.
///
/// # Errors
/// `CategoryNotFound` when it is missing or inactive.
pub async fn get_active_category<C>(db: &C, category_id: &str) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::Status.eq(ListingStatus::Active.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            category_id: category_id.to_string(),
        })
}

/// Creates a category.
///
/// # Errors
/// `Validation` when the name is blank.
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    status: ListingStatus,
) -> Result<category::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::field("name", "กรุณากรอกชื่อหมวดหมู่"));
    }

    category::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        name: Set(name.to_string()),
        status: Set(status.as_str().to_string()),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates every configured category that does not exist yet, matched by name.
///
/// Existing categories are left as they are, so seeding is safe on every start.
///
/// # Returns
/// The number of categories created.
pub async fn seed_categories(db: &DatabaseConnection, configs: &[CategoryConfig]) -> Result<usize> {
    let mut created = 0;
    for config in configs {
        let exists = Category::find()
            .filter(category::Column::Name.eq(config.name.trim()))
            .one(db)
            .await?
            .is_some();
        if exists {
            debug!("Category '{}' already exists. Skipping.", config.name);
            continue;
        }

        let status = if config.active {
            ListingStatus::Active
        } else {
            ListingStatus::Inactive
        };
        create_category(db, &config.name, status).await?;
        created += 1;
    }

    info!("Seeded {created} of {} configured categories.", configs.len());
    Ok(created)
}
