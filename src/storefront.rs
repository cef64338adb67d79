//! Storefront boundary - what a request handler calls.
//!
//! Each method runs one core operation and turns its outcome into an
//! [`ActionResult`]. Cache events are applied only after the operation succeeded.
//! Unexpected failures are logged and replaced by a fixed message, so callers can
//! render [`ActionFailure::message`] as is.

use crate::{
    cache::{CacheEvent, CacheTag, Mutation, Revalidate, TagCache},
    config::store::StoreConfig,
    core::{
        auth::User,
        cart::{self, CartView},
        category,
        checkout::{self, CheckoutForm, OrderCreated},
        inventory::{self, ImageStorage, ProductInput, ProductUpdate, ProductView},
        money::Money,
        order::{self, OrderStatus, OrderView},
        payment,
    },
    entities::{category as category_entity, order as order_entity, product},
    errors::{Error, ErrorKind, FieldErrors, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// A failed action as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionFailure {
    pub kind: ErrorKind,
    /// Localized message safe to display
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<FieldErrors>,
}

impl ActionFailure {
    /// Converts an error, hiding internal detail behind `fallback`.
    #[must_use]
    pub fn from_error(err: Error, fallback: &str) -> Self {
        let kind = err.kind();
        if err.is_internal() {
            error!("{fallback}: {err}");
            return Self {
                kind,
                message: fallback.to_string(),
                field_errors: None,
            };
        }

        debug!("Action rejected ({kind:?}): {err}");
        let message = err.to_string();
        let field_errors = match err {
            Error::Validation { field_errors } => Some(field_errors),
            _ => None,
        };
        Self {
            kind,
            message,
            field_errors,
        }
    }
}

impl fmt::Display for ActionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub type ActionResult<T> = std::result::Result<T, ActionFailure>;

const CATALOG_KEY: &str = "catalog";

/// Storefront state shared by all requests.
pub struct Storefront {
    db: DatabaseConnection,
    config: Arc<StoreConfig>,
    carts: TagCache<Option<CartView>>,
    cart_counts: TagCache<i64>,
    catalog: TagCache<Vec<ProductView>>,
    products: TagCache<Option<ProductView>>,
    revalidators: Vec<Arc<dyn Revalidate>>,
}

impl Storefront {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: Arc<StoreConfig>) -> Self {
        let ttl = config.cache_ttl();
        Self {
            db,
            config,
            carts: TagCache::new(ttl),
            cart_counts: TagCache::new(ttl),
            catalog: TagCache::new(ttl),
            products: TagCache::new(ttl),
            revalidators: Vec::new(),
        }
    }

    /// Registers an external cache layer to notify after each mutation.
    #[must_use]
    pub fn with_revalidator(mut self, revalidator: Arc<dyn Revalidate>) -> Self {
        self.revalidators.push(revalidator);
        self
    }

    #[must_use]
    pub const fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    async fn apply(&self, events: &[CacheEvent]) {
        for CacheEvent::Invalidate(tag) in events {
            self.carts.invalidate(tag).await;
            self.cart_counts.invalidate(tag).await;
            self.catalog.invalidate(tag).await;
            self.products.invalidate(tag).await;
            for revalidator in &self.revalidators {
                revalidator.revalidate(tag);
            }
        }
    }

    async fn finish<T>(&self, result: Result<Mutation<T>>, fallback: &str) -> ActionResult<T> {
        match result {
            Ok(mutation) => {
                self.apply(&mutation.events).await;
                Ok(mutation.value)
            }
            Err(err) => Err(ActionFailure::from_error(err, fallback)),
        }
    }

    /// The caller's cart, cached per user.
    pub async fn get_cart(&self, user: Option<&User>) -> ActionResult<Option<CartView>> {
        let fallback = "เกิดข้อผิดพลาดในการโหลดตะกร้า";
        let user_id = user
            .map(|user| user.id.as_str())
            .ok_or_else(|| ActionFailure::from_error(Error::Unauthenticated, fallback))?;

        let tag = CacheTag::Cart(user_id.to_string());
        let key = tag.to_string();
        if let Some(cart) = self.carts.get(&key).await {
            return Ok(cart);
        }

        let read_at = self.carts.generation().await;
        let cart = cart::get_cart(&self.db, Some(user_id), self.config.low_stock_threshold)
            .await
            .map_err(|e| ActionFailure::from_error(e, fallback))?;
        self.carts.insert(key, vec![tag], cart.clone(), read_at).await;
        Ok(cart)
    }

    /// Units in the caller's cart, for the header badge.
    pub async fn cart_item_count(&self, user: Option<&User>) -> ActionResult<i64> {
        let fallback = "เกิดข้อผิดพลาดในการโหลดตะกร้า";
        let user_id = user
            .map(|user| user.id.as_str())
            .ok_or_else(|| ActionFailure::from_error(Error::Unauthenticated, fallback))?;

        let tag = CacheTag::Cart(user_id.to_string());
        let key = tag.to_string();
        if let Some(count) = self.cart_counts.get(&key).await {
            return Ok(count);
        }

        let read_at = self.cart_counts.generation().await;
        let count = cart::get_cart_item_count(&self.db, Some(user_id))
            .await
            .map_err(|e| ActionFailure::from_error(e, fallback))?;
        self.cart_counts.insert(key, vec![tag], count, read_at).await;
        Ok(count)
    }

    pub async fn add_to_cart(
        &self,
        user: Option<&User>,
        product_id: &str,
        count: i32,
    ) -> ActionResult<Money> {
        let result = cart::add_to_cart(&self.db, user, product_id, count).await;
        self.finish(result, "เกิดข้อผิดพลาดในการเพิ่มสินค้าลงตะกร้า").await
    }

    pub async fn update_cart_item(
        &self,
        user: Option<&User>,
        cart_item_id: &str,
        count: i32,
    ) -> ActionResult<Money> {
        let result = cart::update_cart_item(&self.db, user, cart_item_id, count).await;
        self.finish(result, "เกิดข้อผิดพลาดในการอัปเดตตะกร้า").await
    }

    pub async fn remove_from_cart(
        &self,
        user: Option<&User>,
        cart_item_id: &str,
    ) -> ActionResult<Money> {
        let result = cart::remove_from_cart(&self.db, user, cart_item_id).await;
        self.finish(result, "เกิดข้อผิดพลาดในการลบสินค้าออกจากตะกร้า").await
    }

    pub async fn clear_cart(&self, user: Option<&User>) -> ActionResult<Money> {
        let result = cart::clear_cart(&self.db, user).await;
        self.finish(result, "เกิดข้อผิดพลาดในการล้างตะกร้า").await
    }

    /// Places an order with the configured shipping fee.
    pub async fn create_order(
        &self,
        user: Option<&User>,
        form: CheckoutForm,
    ) -> ActionResult<OrderCreated> {
        let fallback = "เกิดข้อผิดพลาดในการสร้างคำสั่งซื้อ กรุณาลองใหม่ในภายหลัง";
        let shipping_fee = self
            .config
            .shipping_fee()
            .map_err(|e| ActionFailure::from_error(e, fallback))?;
        let result = checkout::create_order(&self.db, user, form, shipping_fee).await;
        self.finish(result, fallback).await
    }

    pub async fn get_order(&self, user: Option<&User>, order_id: &str) -> ActionResult<OrderView> {
        order::get_order(&self.db, user, order_id)
            .await
            .map_err(|e| ActionFailure::from_error(e, "เกิดข้อผิดพลาดในการโหลดคำสั่งซื้อ"))
    }

    pub async fn list_orders(&self, user: Option<&User>) -> ActionResult<Vec<OrderView>> {
        order::list_customer_orders(&self.db, user)
            .await
            .map_err(|e| ActionFailure::from_error(e, "เกิดข้อผิดพลาดในการโหลดคำสั่งซื้อ"))
    }

    pub async fn cancel_order(
        &self,
        user: Option<&User>,
        order_id: &str,
    ) -> ActionResult<order_entity::Model> {
        let result = order::cancel_order(&self.db, user, order_id).await;
        self.finish(result, "เกิดข้อผิดพลาดในการยกเลิกคำสั่งซื้อ").await
    }

    pub async fn update_order_status(
        &self,
        user: Option<&User>,
        order_id: &str,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> ActionResult<order_entity::Model> {
        let result =
            order::update_order_status(&self.db, user, order_id, status, tracking_number).await;
        self.finish(result, "เกิดข้อผิดพลาดในการอัปเดตสถานะคำสั่งซื้อ").await
    }

    /// PromptPay URL for a pending order, using the configured merchant id.
    pub async fn payment_qr(&self, user: Option<&User>, order_id: &str) -> ActionResult<String> {
        payment::payment_qr_for_order(
            &self.db,
            user,
            order_id,
            self.config.promptpay_id.as_deref(),
        )
        .await
        .map_err(|e| ActionFailure::from_error(e, "ไม่สามารถสร้าง QR Code ได้"))
    }

    /// All products, cached under `product:global`.
    pub async fn products(&self) -> ActionResult<Vec<ProductView>> {
        if let Some(products) = self.catalog.get(CATALOG_KEY).await {
            return Ok(products);
        }

        let read_at = self.catalog.generation().await;
        let products = inventory::list_products(&self.db, self.config.low_stock_threshold)
            .await
            .map_err(|e| ActionFailure::from_error(e, "เกิดข้อผิดพลาดในการโหลดสินค้า"))?;
        self.catalog
            .insert(
                CATALOG_KEY,
                vec![CacheTag::ProductGlobal],
                products.clone(),
                read_at,
            )
            .await;
        Ok(products)
    }

    /// One product, cached under `product:<id>`.
    pub async fn product(&self, product_id: &str) -> ActionResult<Option<ProductView>> {
        let tag = CacheTag::Product(product_id.to_string());
        let key = tag.to_string();
        if let Some(product) = self.products.get(&key).await {
            return Ok(product);
        }

        let read_at = self.products.generation().await;
        let product =
            inventory::get_product(&self.db, product_id, self.config.low_stock_threshold)
                .await
                .map_err(|e| ActionFailure::from_error(e, "เกิดข้อผิดพลาดในการโหลดสินค้า"))?;
        self.products
            .insert(key, vec![tag], product.clone(), read_at)
            .await;
        Ok(product)
    }

    pub async fn categories(&self) -> ActionResult<Vec<category_entity::Model>> {
        category::list_categories(&self.db)
            .await
            .map_err(|e| ActionFailure::from_error(e, "เกิดข้อผิดพลาดในการโหลดหมวดหมู่"))
    }

    pub async fn create_product(
        &self,
        user: Option<&User>,
        input: ProductInput,
    ) -> ActionResult<product::Model> {
        let result = inventory::create_product(&self.db, user, input).await;
        self.finish(result, "เกิดข้อผิดพลาดในการเพิ่มสินค้า").await
    }

    pub async fn update_product<S>(
        &self,
        user: Option<&User>,
        update: ProductUpdate,
        storage: &S,
    ) -> ActionResult<product::Model>
    where
        S: ImageStorage,
    {
        let result = inventory::update_product(&self.db, user, update, storage).await;
        self.finish(result, "เกิดข้อผิดพลาดในการแก้ไขสินค้า").await
    }
}
