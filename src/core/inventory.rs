//! Inventory and pricing ledger.
//!
//! Products are the authoritative record of price and stock. Checkout moves stock
//! through [`reserve_stock`], a single conditional update that refuses to go below
//! zero; admins edit products through [`create_product`] and [`update_product`].
//! Catalog reads build [`ProductView`]s with the main image, a low-stock flag and the
//! synthetic SKU.

use crate::{
    cache::{CacheEvent, CacheTag, Mutation},
    core::{
        auth::{User, authorize, can_create_product},
        category,
        money::Money,
    },
    entities::{Category, Product, ProductImage, category as category_entity, product, product_image},
    errors::{Error, FieldErrors, Result},
};
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Whether a product or category is offered for sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Inactive,
}

impl ListingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Active" => Ok(Self::Active),
            "Inactive" => Ok(Self::Inactive),
            other => Err(Error::InvalidData {
                message: format!("unknown listing status `{other}`"),
            }),
        }
    }
}

/// Display SKU derived from the product id.
#[must_use]
pub fn sku_for(product_id: &str) -> String {
    product_id.chars().take(8).collect::<String>().to_uppercase()
}

#[must_use]
pub const fn is_low_stock(stock: i32, threshold: i32) -> bool {
    stock <= threshold
}

/// Loads the current product row, whatever its status.
pub async fn get_live_product<C>(db: &C, product_id: &str) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Loads a product that can be sold right now.
///
/// # Errors
/// `ProductNotFound` when the product is missing or not active.
pub async fn find_active_product<C>(db: &C, product_id: &str) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .filter(product::Column::Status.eq(ListingStatus::Active.as_str()))
        .one(db)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            product_id: product_id.to_string(),
        })
}

/// URL of the product's main image, if it has one.
pub async fn main_image_url<C>(db: &C, product_id: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let image = ProductImage::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .filter(product_image::Column::IsMain.eq(true))
        .one(db)
        .await?;
    Ok(image.map(|image| image.url))
}

/// Atomically takes `quantity` units out of stock and adds them to `sold`.
///
/// This is a single statement:
/// `UPDATE products SET stock = stock - q, sold = sold + q WHERE id = ? AND stock >= q`.
/// The guard is evaluated against the row as it is being written, so two writers
/// racing for the last unit cannot both succeed and stock never goes negative.
///
/// # Returns
/// `true` when the stock was taken, `false` when there was not enough.
pub async fn reserve_stock<C>(db: &C, product_id: &str, quantity: i32) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Product::update_many()
        .col_expr(
            product::Column::Stock,
            Expr::col(product::Column::Stock).sub(quantity),
        )
        .col_expr(
            product::Column::Sold,
            Expr::col(product::Column::Sold).add(quantity),
        )
        .col_expr(
            product::Column::UpdatedAt,
            Expr::value(chrono::Utc::now()),
        )
        .filter(product::Column::Id.eq(product_id))
        .filter(product::Column::Stock.gte(quantity))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Product image as shown to shoppers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageView {
    pub id: String,
    pub url: String,
    pub is_main: bool,
}

impl From<&product_image::Model> for ImageView {
    fn from(image: &product_image::Model) -> Self {
        Self {
            id: image.id.clone(),
            url: image.url.clone(),
            is_main: image.is_main,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
    pub status: ListingStatus,
}

/// A product enriched for catalog display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub id: String,
    pub sku: String,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub cost: Option<Money>,
    pub stock: i32,
    pub sold: i32,
    pub status: ListingStatus,
    pub low_stock: bool,
    pub category: Option<CategoryRef>,
    pub main_image: Option<ImageView>,
    /// Index of the main image in `images`, 0 when there is none
    pub main_image_index: usize,
    pub images: Vec<ImageView>,
}

fn product_view(
    product: product::Model,
    category: Option<category_entity::Model>,
    images: &[product_image::Model],
    low_stock_threshold: i32,
) -> Result<ProductView> {
    let images: Vec<ImageView> = images.iter().map(ImageView::from).collect();
    let main_image_index = images.iter().position(|image| image.is_main);
    let category = category
        .map(|category| -> Result<CategoryRef> {
            Ok(CategoryRef {
                status: category.status.parse()?,
                id: category.id,
                name: category.name,
            })
        })
        .transpose()?;

    Ok(ProductView {
        sku: sku_for(&product.id),
        status: product.status.parse()?,
        low_stock: is_low_stock(product.stock, low_stock_threshold),
        price: Money::from_satang(product.price),
        cost: product.cost.map(Money::from_satang),
        main_image: main_image_index.and_then(|index| images.get(index).cloned()),
        main_image_index: main_image_index.unwrap_or(0),
        images,
        category,
        id: product.id,
        title: product.title,
        description: product.description,
        stock: product.stock,
        sold: product.sold,
    })
}

async fn images_by_product<C>(
    db: &C,
    product_ids: Vec<String>,
) -> Result<HashMap<String, Vec<product_image::Model>>>
where
    C: ConnectionTrait,
{
    let images = ProductImage::find()
        .filter(product_image::Column::ProductId.is_in(product_ids))
        .order_by_asc(product_image::Column::Position)
        .all(db)
        .await?;

    let mut grouped: HashMap<String, Vec<product_image::Model>> = HashMap::new();
    for image in images {
        grouped.entry(image.product_id.clone()).or_default().push(image);
    }
    Ok(grouped)
}

/// Lists every product with its category and images, ordered by title.
pub async fn list_products(
    db: &DatabaseConnection,
    low_stock_threshold: i32,
) -> Result<Vec<ProductView>> {
    let products = Product::find()
        .find_also_related(Category)
        .order_by_asc(product::Column::Title)
        .all(db)
        .await?;

    let ids = products.iter().map(|(product, _)| product.id.clone()).collect();
    let images = images_by_product(db, ids).await?;

    products
        .into_iter()
        .map(|(product, category)| {
            let product_images = images.get(&product.id).map_or(&[][..], Vec::as_slice);
            product_view(product, category, product_images, low_stock_threshold)
        })
        .collect()
}

/// Loads one product for display, or `None` if it does not exist.
pub async fn get_product(
    db: &DatabaseConnection,
    product_id: &str,
    low_stock_threshold: i32,
) -> Result<Option<ProductView>> {
    let Some((product, category)) = Product::find_by_id(product_id)
        .find_also_related(Category)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let images = ProductImage::find()
        .filter(product_image::Column::ProductId.eq(product_id))
        .order_by_asc(product_image::Column::Position)
        .all(db)
        .await?;

    product_view(product, category, &images, low_stock_threshold).map(Some)
}

/// An uploaded image to attach to a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewImage {
    pub url: String,
    pub file_id: String,
}

/// Product form submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub cost: Option<Decimal>,
    pub stock: i32,
    pub status: ListingStatus,
    pub category_id: String,
    #[serde(default)]
    pub images: Vec<NewImage>,
    #[serde(default)]
    pub main_image_index: usize,
}

/// Changes to an existing product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductUpdate {
    pub id: String,
    #[serde(flatten)]
    pub input: ProductInput,
    /// Images to remove from the product and from storage
    #[serde(default)]
    pub deleted_image_ids: Vec<String>,
}

#[derive(Debug)]
struct ValidProduct {
    title: String,
    description: String,
    price: Money,
    cost: Option<Money>,
    stock: i32,
    status: ListingStatus,
    category_id: String,
}

impl ProductInput {
    fn validate(&self) -> Result<ValidProduct> {
        let mut field_errors = FieldErrors::new();
        let mut reject = |field: &str, message: &str| {
            field_errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        let title = self.title.trim();
        if title.chars().count() < 3 {
            reject("title", "ชื่อสินค้าต้องมีอย่างน้อย 3 ตัวอักษร");
        }
        let price = Money::from_decimal(self.price).ok();
        if price.is_none() {
            reject("price", "ราคาต้องเป็นจำนวนเงินที่ไม่ติดลบ");
        }
        let cost = self.cost.map(Money::from_decimal).transpose().ok();
        if cost.is_none() {
            reject("cost", "ต้นทุนต้องเป็นจำนวนเงินที่ไม่ติดลบ");
        }
        if self.stock < 0 {
            reject("stock", "จำนวนสต๊อกต้องไม่ติดลบ");
        }
        if self.category_id.trim().is_empty() {
            reject("category_id", "กรุณาเลือกหมวดหมู่สินค้า");
        }

        match (price, cost) {
            (Some(price), Some(cost)) if field_errors.is_empty() => Ok(ValidProduct {
                title: title.to_string(),
                description: self.description.trim().to_string(),
                price,
                cost,
                stock: self.stock,
                status: self.status,
                category_id: self.category_id.trim().to_string(),
            }),
            _ => Err(Error::Validation { field_errors }),
        }
    }
}

/// Deletes uploaded files from image storage.
pub trait ImageStorage {
    fn delete_file(&self, file_id: &str) -> impl Future<Output = Result<()>> + Send;
}

fn product_events(product_id: &str) -> Vec<CacheEvent> {
    vec![
        CacheEvent::Invalidate(CacheTag::Product(product_id.to_string())),
        CacheEvent::Invalidate(CacheTag::ProductGlobal),
    ]
}

fn new_image(
    image: &NewImage,
    product_id: &str,
    position: usize,
    is_main: bool,
) -> Result<product_image::ActiveModel> {
    let position = i32::try_from(position).map_err(|_| Error::field("images", "รูปภาพมากเกินไป"))?;
    Ok(product_image::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        url: Set(image.url.clone()),
        file_id: Set(image.file_id.clone()),
        is_main: Set(is_main),
        position: Set(position),
        product_id: Set(product_id.to_string()),
    })
}

/// Creates a product and its images. The image at `main_image_index` (clamped to the
/// last image) becomes the main image.
///
/// # Errors
/// - `Unauthenticated` / `Forbidden` unless the caller can create products
/// - `Validation` for bad form fields
/// - `CategoryNotFound` when the category is missing or inactive
#[instrument(skip(db, user, input), fields(title = %input.title))]
pub async fn create_product(
    db: &DatabaseConnection,
    user: Option<&User>,
    input: ProductInput,
) -> Result<Mutation<product::Model>> {
    authorize(user, can_create_product)?;
    let valid = input.validate()?;
    category::get_active_category(db, &valid.category_id).await?;

    let now = chrono::Utc::now();
    let txn = db.begin().await?;

    let product = product::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        title: Set(valid.title),
        description: Set(valid.description),
        price: Set(valid.price.satang()),
        cost: Set(valid.cost.map(Money::satang)),
        stock: Set(valid.stock),
        sold: Set(0),
        status: Set(valid.status.as_str().to_string()),
        category_id: Set(valid.category_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let main_index = input.main_image_index.min(input.images.len().saturating_sub(1));
    for (index, image) in input.images.iter().enumerate() {
        new_image(image, &product.id, index, index == main_index)?
            .insert(&txn)
            .await?;
    }

    txn.commit().await?;
    info!("Created product {}", product.id);

    let events = product_events(&product.id);
    Ok(Mutation::new(product, events))
}

/// Updates a product's fields, stock and images.
///
/// Removed images are deleted from the database together with the product update,
/// then from storage. New images are appended after the existing ones and the main
/// flag is moved to `main_image_index`, clamped to the remaining images.
///
/// # Errors
/// As [`create_product`], plus `ProductNotFound` when the product does not exist.
#[instrument(skip(db, user, update, storage), fields(product_id = %update.id))]
pub async fn update_product<S>(
    db: &DatabaseConnection,
    user: Option<&User>,
    update: ProductUpdate,
    storage: &S,
) -> Result<Mutation<product::Model>>
where
    S: ImageStorage,
{
    authorize(user, can_create_product)?;
    let valid = update.input.validate()?;

    let existing = get_live_product(db, &update.id)
        .await?
        .ok_or_else(|| Error::ProductNotFound {
            product_id: update.id.clone(),
        })?;
    category::get_active_category(db, &valid.category_id).await?;

    let existing_images = ProductImage::find()
        .filter(product_image::Column::ProductId.eq(existing.id.as_str()))
        .all(db)
        .await?;
    let removed: Vec<product_image::Model> = existing_images
        .iter()
        .filter(|image| update.deleted_image_ids.contains(&image.id))
        .cloned()
        .collect();

    let txn = db.begin().await?;

    let mut product: product::ActiveModel = existing.into();
    product.title = Set(valid.title);
    product.description = Set(valid.description);
    product.price = Set(valid.price.satang());
    product.cost = Set(valid.cost.map(Money::satang));
    product.stock = Set(valid.stock);
    product.status = Set(valid.status.as_str().to_string());
    product.category_id = Set(valid.category_id);
    product.updated_at = Set(chrono::Utc::now());
    let product = product.update(&txn).await?;

    if !removed.is_empty() {
        ProductImage::delete_many()
            .filter(product_image::Column::Id.is_in(removed.iter().map(|image| image.id.clone())))
            .filter(product_image::Column::ProductId.eq(product.id.as_str()))
            .exec(&txn)
            .await?;
    }

    ProductImage::update_many()
        .col_expr(product_image::Column::IsMain, Expr::value(false))
        .filter(product_image::Column::ProductId.eq(product.id.as_str()))
        .exec(&txn)
        .await?;

    let next_position = existing_images
        .iter()
        .map(|image| usize::try_from(image.position).unwrap_or(0) + 1)
        .max()
        .unwrap_or(0);
    for (offset, image) in update.input.images.iter().enumerate() {
        new_image(image, &product.id, next_position + offset, false)?
            .insert(&txn)
            .await?;
    }

    let remaining = ProductImage::find()
        .filter(product_image::Column::ProductId.eq(product.id.as_str()))
        .order_by_asc(product_image::Column::Position)
        .all(&txn)
        .await?;
    let main_index = update.input.main_image_index.min(remaining.len().saturating_sub(1));
    if let Some(main) = remaining.get(main_index) {
        let mut main: product_image::ActiveModel = main.clone().into();
        main.is_main = Set(true);
        main.update(&txn).await?;
    }

    txn.commit().await?;

    for image in &removed {
        if let Err(e) = storage.delete_file(&image.file_id).await {
            warn!("Failed to delete image file {} from storage: {e}", image.file_id);
        }
    }

    info!("Updated product {}", product.id);
    let events = product_events(&product.id);
    Ok(Mutation::new(product, events))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::auth::Role;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        deleted: Mutex<Vec<String>>,
    }

    impl ImageStorage for RecordingStorage {
        async fn delete_file(&self, file_id: &str) -> Result<()> {
            self.deleted.lock().unwrap().push(file_id.to_string());
            Ok(())
        }
    }

    fn input(category_id: &str) -> ProductInput {
        ProductInput {
            title: "Canvas Tote".to_string(),
            description: "Plain tote bag".to_string(),
            price: Decimal::new(25_000, 2),
            cost: Some(Decimal::new(120, 0)),
            stock: 10,
            status: ListingStatus::Active,
            category_id: category_id.to_string(),
            images: vec![
                NewImage {
                    url: "https://img.test/a.jpg".to_string(),
                    file_id: "file-a".to_string(),
                },
                NewImage {
                    url: "https://img.test/b.jpg".to_string(),
                    file_id: "file-b".to_string(),
                },
            ],
            main_image_index: 1,
        }
    }

    #[test]
    fn test_sku_is_first_eight_characters_upper_cased() {
        assert_eq!(sku_for("3fa9c1d2-7b4e-4c1a-9d2e-1234567890ab"), "3FA9C1D2");
        assert_eq!(sku_for("abc"), "ABC");
    }

    #[test]
    fn test_unknown_listing_status_is_bad_stored_data() {
        assert_eq!("Inactive".parse::<ListingStatus>().ok(), Some(ListingStatus::Inactive));
        assert!(matches!(
            "Archived".parse::<ListingStatus>(),
            Err(Error::InvalidData { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_product_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let admin = test_user(Role::Admin);

        let mut bad = input("cat");
        bad.title = "  ".to_string();
        bad.price = Decimal::new(-1, 0);
        bad.stock = -3;

        match create_product(&db, Some(&admin), bad).await {
            Err(Error::Validation { field_errors }) => {
                assert!(field_errors.contains_key("title"));
                assert!(field_errors.contains_key("price"));
                assert!(field_errors.contains_key("stock"));
                assert!(!field_errors.contains_key("cost"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_requires_admin() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let customer = test_user(Role::Customer);

        let result = create_product(&db, Some(&customer), input("cat")).await;
        assert!(matches!(result, Err(Error::Forbidden)));
        let result = create_product(&db, None, input("cat")).await;
        assert!(matches!(result, Err(Error::Unauthenticated)));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_with_images_integration() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let admin = test_user(Role::Admin);

        let created = create_product(&db, Some(&admin), input(&category.id)).await?;
        assert_eq!(created.value.price, 25_000);
        assert_eq!(created.value.sold, 0);
        assert!(created
            .tags()
            .any(|tag| *tag == CacheTag::Product(created.value.id.clone())));

        let view = get_product(&db, &created.value.id, 5).await?.unwrap();
        assert_eq!(view.images.len(), 2);
        assert_eq!(view.main_image_index, 1);
        assert_eq!(view.main_image.unwrap().url, "https://img.test/b.jpg");
        assert_eq!(view.sku, sku_for(&created.value.id));
        assert!(!view.low_stock);
        assert_eq!(view.category.unwrap().name, category.name);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_product_rejects_inactive_category() -> Result<()> {
        let db = setup_test_db().await?;
        let hidden = category::create_category(&db, "Hidden", ListingStatus::Inactive).await?;
        let admin = test_user(Role::Admin);

        let result = create_product(&db, Some(&admin), input(&hidden.id)).await;
        assert!(matches!(result, Err(Error::CategoryNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_product_replaces_images_and_clamps_main_index() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let admin = test_user(Role::Admin);
        let storage = RecordingStorage::default();

        let created = create_product(&db, Some(&admin), input(&category.id)).await?;
        let before = get_product(&db, &created.value.id, 5).await?.unwrap();
        let first_image = before.images[0].id.clone();

        let mut changed = input(&category.id);
        changed.title = "Canvas Tote XL".to_string();
        changed.stock = 3;
        changed.images = vec![NewImage {
            url: "https://img.test/c.jpg".to_string(),
            file_id: "file-c".to_string(),
        }];
        changed.main_image_index = 99;

        let updated = update_product(
            &db,
            Some(&admin),
            ProductUpdate {
                id: created.value.id.clone(),
                input: changed,
                deleted_image_ids: vec![first_image],
            },
            &storage,
        )
        .await?;
        assert_eq!(updated.value.title, "Canvas Tote XL");
        assert_eq!(updated.value.stock, 3);

        let after = get_product(&db, &created.value.id, 5).await?.unwrap();
        let urls: Vec<&str> = after.images.iter().map(|image| image.url.as_str()).collect();
        assert_eq!(urls, ["https://img.test/b.jpg", "https://img.test/c.jpg"]);
        assert_eq!(after.images.iter().filter(|image| image.is_main).count(), 1);
        assert_eq!(after.main_image.unwrap().url, "https://img.test/c.jpg");
        assert!(after.low_stock);
        assert_eq!(*storage.deleted.lock().unwrap(), vec!["file-a".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let admin = test_user(Role::Admin);

        let result = update_product(
            &db,
            Some(&admin),
            ProductUpdate {
                id: "missing".to_string(),
                input: input(&category.id),
                deleted_image_ids: Vec::new(),
            },
            &RecordingStorage::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_stock_never_goes_negative() -> Result<()> {
        let (db, _category, product) = setup_with_product(100, 2).await?;

        assert!(reserve_stock(&db, &product.id, 2).await?);
        assert!(!reserve_stock(&db, &product.id, 1).await?);

        let live = get_live_product(&db, &product.id).await?.unwrap();
        assert_eq!(live.stock, 0);
        assert_eq!(live.sold, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_find_active_product_hides_inactive() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        let product =
            create_custom_product(&db, &category.id, "Old Stock", 10, 5, ListingStatus::Inactive)
                .await?;

        let result = find_active_product(&db, &product.id).await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));
        assert!(get_live_product(&db, &product.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_products_orders_by_title() -> Result<()> {
        let (db, category) = setup_with_category().await?;
        create_custom_product(&db, &category.id, "Zip Hoodie", 900, 2, ListingStatus::Active)
            .await?;
        create_custom_product(&db, &category.id, "Ankle Socks", 90, 40, ListingStatus::Active)
            .await?;

        let products = list_products(&db, 5).await?;
        let titles: Vec<&str> = products.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["Ankle Socks", "Zip Hoodie"]);
        assert!(products[1].low_stock);
        assert!(products[0].main_image.is_none());
        Ok(())
    }
}
