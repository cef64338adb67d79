//! Checkout - turns the caller's cart into an order.
//!
//! The form is validated and the cart is read before any write. The order, its item
//! snapshots and the stock decrements are then written in one transaction. Each line
//! re-reads the live product inside the transaction, and the decrement itself is
//! guarded by [`inventory::reserve_stock`], so two checkouts racing for the last
//! unit cannot both succeed. The cart is cleared only after the commit.

use crate::{
    cache::{CacheEvent, CacheTag, Mutation},
    core::{
        auth::{User, authorize, can_create_order},
        cart,
        inventory,
        money::Money,
        order::{self, OrderStatus},
    },
    entities::{order as order_entity, order_item},
    errors::{Error, FieldErrors, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Checkout form as submitted by the customer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub note: Option<String>,
    /// `"on"` when the customer ticked "use my saved address"
    #[serde(default)]
    pub use_profile_data: Option<String>,
}

/// Shipping details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub address: String,
    pub phone: String,
    pub note: Option<String>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderCreated {
    pub order_id: String,
    pub order_number: String,
    pub total_amount: Money,
}

fn is_valid_phone(phone: &str) -> bool {
    (9..=10).contains(&phone.len())
        && phone.starts_with('0')
        && phone.chars().all(|c| c.is_ascii_digit())
}

impl CheckoutForm {
    /// Replaces address and phone with the saved profile when the customer asked for
    /// it and both are on file.
    #[must_use]
    pub fn with_profile(mut self, user: &User) -> Self {
        if self.use_profile_data.as_deref() == Some("on") {
            if let (Some(address), Some(tel)) = (&user.address, &user.tel) {
                self.address.clone_from(address);
                self.phone.clone_from(tel);
            }
        }
        self
    }

    /// Checks the form and returns the cleaned details.
    ///
    /// # Errors
    /// `Validation` with messages for each bad field.
    pub fn validate(&self) -> Result<CheckoutDetails> {
        let mut field_errors = FieldErrors::new();

        let address = self.address.trim();
        if address.is_empty() {
            field_errors
                .entry("address".to_string())
                .or_default()
                .push("กรุณากรอกที่อยู่จัดส่ง".to_string());
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            field_errors
                .entry("phone".to_string())
                .or_default()
                .push("กรุณากรอกเบอร์โทรศัพท์".to_string());
        } else if !is_valid_phone(phone) {
            field_errors
                .entry("phone".to_string())
                .or_default()
                .push("เบอร์โทรศัพท์ไม่ถูกต้อง".to_string());
        }

        if !field_errors.is_empty() {
            return Err(Error::Validation { field_errors });
        }

        Ok(CheckoutDetails {
            address: address.to_string(),
            phone: phone.to_string(),
            note: self
                .note
                .as_deref()
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .map(str::to_string),
        })
    }
}

/// Human-readable order number: `ORD-<yyyymmddHHMMSS>-<6 hex>`.
#[must_use]
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(6)
        .collect();
    format!(
        "ORD-{}-{}",
        now.format("%Y%m%d%H%M%S"),
        suffix.to_uppercase()
    )
}

fn shortage(product: &crate::entities::ProductModel, requested: i32) -> Error {
    Error::InsufficientStock {
        product_id: product.id.clone(),
        title: Some(product.title.clone()),
        requested,
        available: product.stock,
    }
}

/// Places an order for everything in the caller's cart.
///
/// `total_amount` is the cart total plus `shipping_fee`. Order items copy the title,
/// main image and price of each line, so later product edits do not change them.
///
/// The customer pays the price shown in the cart. Each item's `line_total` is the
/// cart line total, fixed at the catalog price when the line was last added to or
/// changed, and `unit_price` is that total divided by the quantity. A catalog price
/// change between adding to the cart and checking out is not applied.
///
/// # Errors
/// - `Unauthenticated` / `Forbidden` unless the caller can place orders
/// - `Validation` for a bad address or phone
/// - `EmptyCart` when the cart is missing or has no lines
/// - `ProductNotFound` when a product was removed or deactivated
/// - `InsufficientStock` naming the product that ran short
///
/// Nothing is written when any of these occur after the transaction has started.
#[instrument(skip(db, user, form), fields(user_id = tracing::field::Empty))]
pub async fn create_order(
    db: &DatabaseConnection,
    user: Option<&User>,
    form: CheckoutForm,
    shipping_fee: Money,
) -> Result<Mutation<OrderCreated>> {
    let user = authorize(user, can_create_order)?;
    tracing::Span::current().record("user_id", user.id.as_str());

    let details = form.with_profile(user).validate()?;

    let cart = cart::find_cart(db, &user.id).await?.ok_or(Error::EmptyCart)?;
    let lines = cart::get_cart_lines(db, &cart.id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }

    for (item, product) in &lines {
        let product = product.as_ref().ok_or_else(|| Error::ProductNotFound {
            product_id: item.product_id.clone(),
        })?;
        if product.stock < item.quantity {
            return Err(shortage(product, item.quantity));
        }
    }

    let total_amount = Money::from_satang(cart.total) + shipping_fee;
    let now = Utc::now();
    let order_number = generate_order_number(now);

    let txn = db.begin().await?;

    let order = order_entity::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        order_number: Set(order_number),
        total_amount: Set(total_amount.satang()),
        shipping_fee: Set(shipping_fee.satang()),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        address: Set(details.address),
        phone: Set(details.phone),
        note: Set(details.note),
        tracking_number: Set(None),
        customer_id: Set(user.id.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut product_ids = Vec::with_capacity(lines.len());
    for (item, _) in &lines {
        let product = inventory::find_active_product(&txn, &item.product_id).await?;
        if product.stock < item.quantity {
            return Err(shortage(&product, item.quantity));
        }

        order_item::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            quantity: Set(item.quantity),
            unit_price: Set(item.line_total / i64::from(item.quantity.max(1))),
            line_total: Set(item.line_total),
            product_title: Set(product.title.clone()),
            product_image: Set(inventory::main_image_url(&txn, &product.id).await?),
            product_id: Set(Some(product.id.clone())),
            order_id: Set(order.id.clone()),
        }
        .insert(&txn)
        .await?;

        if !inventory::reserve_stock(&txn, &product.id, item.quantity).await? {
            return Err(shortage(&product, item.quantity));
        }
        product_ids.push(product.id);
    }

    txn.commit().await?;
    info!(
        "Order {} placed by {} for {total_amount}",
        order.order_number, user.id
    );

    let mut created = Mutation::new(
        OrderCreated {
            order_id: order.id.clone(),
            order_number: order.order_number,
            total_amount,
        },
        order::order_events(&order.id, &user.id),
    );
    created.absorb(
        product_ids
            .into_iter()
            .map(|id| CacheEvent::Invalidate(CacheTag::Product(id)))
            .chain([CacheEvent::Invalidate(CacheTag::ProductGlobal)])
            .collect(),
    );

    match cart::clear_cart(db, Some(user)).await {
        Ok(cleared) => created.absorb(cleared.events),
        Err(e) => {
            warn!("Order {} placed but clearing the cart failed: {e}", order.id);
            created.absorb(cart::cart_events(&user.id));
        }
    }

    Ok(created)
}
