//! Cart business logic - the per-user shopping cart.
//!
//! Every mutation rewrites the cached cart total from the line totals afterwards,
//! so a partial failure between the two writes heals on the next mutation. Each
//! mutation returns the new total and a `cart:<userId>` invalidation.

use crate::{
    cache::{CacheEvent, CacheTag, Mutation},
    core::{
        auth::{User, authorize, can_update_user_cart},
        inventory::{self, ImageView, ListingStatus},
        money::Money,
    },
    entities::{Cart, CartItem, Product, ProductImage, cart, cart_item, product, product_image},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Product details shown next to a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartProduct {
    pub id: String,
    pub sku: String,
    pub title: String,
    pub price: Money,
    pub stock: i32,
    pub status: ListingStatus,
    pub low_stock: bool,
    pub main_image: Option<ImageView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: String,
    pub quantity: i32,
    pub line_total: Money,
    pub product: CartProduct,
}

/// A user's cart with enriched lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub id: String,
    pub user_id: String,
    pub total: Money,
    pub items: Vec<CartLine>,
    /// Total units across all lines
    pub item_count: i64,
}

/// Tags to invalidate after the user's cart changes.
#[must_use]
pub fn cart_events(user_id: &str) -> Vec<CacheEvent> {
    vec![CacheEvent::Invalidate(CacheTag::Cart(user_id.to_string()))]
}

/// Finds the cart owned by `user_id`.
pub async fn find_cart<C>(db: &C, user_id: &str) -> Result<Option<cart::Model>>
where
    C: ConnectionTrait,
{
    Cart::find()
        .filter(cart::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

async fn get_or_create_cart(db: &DatabaseConnection, user_id: &str) -> Result<cart::Model> {
    if let Some(cart) = find_cart(db, user_id).await? {
        return Ok(cart);
    }

    let now = chrono::Utc::now();
    let new_cart = cart::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        user_id: Set(user_id.to_string()),
        total: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    match new_cart.insert(db).await {
        Ok(cart) => {
            debug!("Created cart {} for user {user_id}", cart.id);
            Ok(cart)
        }
        // Another request created it first; the unique user_id rejected ours.
        Err(err) => find_cart(db, user_id).await?.ok_or(Error::Database(err)),
    }
}

/// Loads all lines of a cart together with their products.
pub async fn get_cart_lines<C>(
    db: &C,
    cart_id: &str,
) -> Result<Vec<(cart_item::Model, Option<product::Model>)>>
where
    C: ConnectionTrait,
{
    CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .find_also_related(Product)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rewrites the cart total as the sum of its line totals.
pub async fn recalculate_cart_total<C>(db: &C, cart_id: &str) -> Result<Money>
where
    C: ConnectionTrait,
{
    let items = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .all(db)
        .await?;
    let total: Money = items
        .iter()
        .map(|item| Money::from_satang(item.line_total))
        .sum();

    Cart::update_many()
        .col_expr(cart::Column::Total, Expr::value(total.satang()))
        .col_expr(cart::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(cart::Column::Id.eq(cart_id))
        .exec(db)
        .await?;

    Ok(total)
}

/// Returns the user's cart with product details, or `None` if they have no cart.
///
/// # Errors
/// `Unauthenticated` when there is no user.
pub async fn get_cart(
    db: &DatabaseConnection,
    user_id: Option<&str>,
    low_stock_threshold: i32,
) -> Result<Option<CartView>> {
    let user_id = user_id.ok_or(Error::Unauthenticated)?;
    let Some(cart) = find_cart(db, user_id).await? else {
        return Ok(None);
    };

    let lines = get_cart_lines(db, &cart.id).await?;
    let product_ids: Vec<String> = lines.iter().map(|(item, _)| item.product_id.clone()).collect();
    let main_images: HashMap<String, ImageView> = ProductImage::find()
        .filter(product_image::Column::ProductId.is_in(product_ids))
        .filter(product_image::Column::IsMain.eq(true))
        .all(db)
        .await?
        .iter()
        .map(|image| (image.product_id.clone(), ImageView::from(image)))
        .collect();

    let mut items = Vec::with_capacity(lines.len());
    for (item, product) in lines {
        let Some(product) = product else {
            warn!("Cart item {} points at a missing product", item.id);
            continue;
        };
        items.push(CartLine {
            product: CartProduct {
                sku: inventory::sku_for(&product.id),
                price: Money::from_satang(product.price),
                status: product.status.parse()?,
                low_stock: inventory::is_low_stock(product.stock, low_stock_threshold),
                main_image: main_images.get(&product.id).cloned(),
                stock: product.stock,
                title: product.title,
                id: product.id,
            },
            id: item.id,
            quantity: item.quantity,
            line_total: Money::from_satang(item.line_total),
        });
    }

    Ok(Some(CartView {
        item_count: items.iter().map(|line| i64::from(line.quantity)).sum(),
        id: cart.id,
        user_id: cart.user_id,
        total: Money::from_satang(cart.total),
        items,
    }))
}

/// Total units in the user's cart, 0 when they have none.
pub async fn get_cart_item_count(db: &DatabaseConnection, user_id: Option<&str>) -> Result<i64> {
    let user_id = user_id.ok_or(Error::Unauthenticated)?;
    let Some(cart) = find_cart(db, user_id).await? else {
        return Ok(0);
    };

    let items = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .all(db)
        .await?;
    Ok(items.iter().map(|item| i64::from(item.quantity)).sum())
}

fn shortage(product: &product::Model, requested: i32) -> Error {
    Error::InsufficientStock {
        product_id: product.id.clone(),
        title: None,
        requested,
        available: product.stock,
    }
}

/// Grows the cart's line for `product` by `count` in one statement that refuses to
/// take the line past the product's stock.
///
/// # Returns
/// `false` when the cart has no line for the product yet.
async fn merge_into_line(
    db: &DatabaseConnection,
    cart_id: &str,
    product: &product::Model,
    count: i32,
) -> Result<bool> {
    let quantity = Expr::col(cart_item::Column::Quantity).add(count);
    let result = CartItem::update_many()
        .col_expr(cart_item::Column::Quantity, quantity.clone())
        .col_expr(
            cart_item::Column::LineTotal,
            Expr::expr(quantity.clone()).mul(product.price),
        )
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product.id.as_str()))
        .filter(Expr::expr(quantity).lte(product.stock))
        .exec(db)
        .await?;
    if result.rows_affected > 0 {
        return Ok(true);
    }

    let line = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .filter(cart_item::Column::ProductId.eq(product.id.as_str()))
        .one(db)
        .await?;
    match line {
        Some(line) => Err(shortage(product, line.quantity.saturating_add(count))),
        None => Ok(false),
    }
}

/// Adds `count` units of a product to the caller's cart, creating the cart on first
/// use and merging with an existing line for the same product.
///
/// A cart holds at most one line per product (unique index on `cart_id, product_id`).
/// When two adds race to create that line, the loser's insert is rejected and its
/// units are merged into the winner's line instead.
///
/// # Errors
/// - `InvalidQuantity` when `count < 1`
/// - `ProductNotFound` when the product is missing or inactive
/// - `InsufficientStock` when the resulting line would exceed live stock
#[instrument(skip(db, user))]
pub async fn add_to_cart(
    db: &DatabaseConnection,
    user: Option<&User>,
    product_id: &str,
    count: i32,
) -> Result<Mutation<Money>> {
    let user = authorize(user, can_update_user_cart)?;
    if count < 1 {
        return Err(Error::InvalidQuantity { quantity: count });
    }

    let product = inventory::find_active_product(db, product_id).await?;
    if product.stock < count {
        return Err(shortage(&product, count));
    }

    let cart = get_or_create_cart(db, &user.id).await?;
    if !merge_into_line(db, &cart.id, &product, count).await? {
        let line = cart_item::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            quantity: Set(count),
            line_total: Set(Money::from_satang(product.price).times(count).satang()),
            cart_id: Set(cart.id.clone()),
            product_id: Set(product.id.clone()),
        };
        if let Err(err) = line.insert(db).await {
            debug!(
                "Line for product {} in cart {} was created concurrently: {err}",
                product.id, cart.id
            );
            if !merge_into_line(db, &cart.id, &product, count).await? {
                return Err(Error::Database(err));
            }
        }
    }

    let total = recalculate_cart_total(db, &cart.id).await?;
    Ok(Mutation::new(total, cart_events(&user.id)))
}

/// Loads a cart line and checks that it belongs to `user`.
async fn owned_item(
    db: &DatabaseConnection,
    user: &User,
    cart_item_id: &str,
) -> Result<cart_item::Model> {
    let (item, cart) = CartItem::find_by_id(cart_item_id)
        .find_also_related(Cart)
        .one(db)
        .await?
        .ok_or_else(|| Error::CartItemNotFound {
            cart_item_id: cart_item_id.to_string(),
        })?;

    match cart {
        Some(cart) if cart.user_id == user.id => Ok(item),
        _ => Err(Error::Forbidden),
    }
}

/// Sets the quantity of one of the caller's cart lines.
///
/// # Errors
/// - `InvalidQuantity` when `new_count < 1`
/// - `CartItemNotFound` / `Forbidden` when the line is missing or not the caller's
/// - `ProductNotFound` when the product was removed or deactivated
/// - `InsufficientStock` when `new_count` exceeds live stock
#[instrument(skip(db, user))]
pub async fn update_cart_item(
    db: &DatabaseConnection,
    user: Option<&User>,
    cart_item_id: &str,
    new_count: i32,
) -> Result<Mutation<Money>> {
    let user = authorize(user, can_update_user_cart)?;
    if new_count < 1 {
        return Err(Error::InvalidQuantity {
            quantity: new_count,
        });
    }

    let item = owned_item(db, user, cart_item_id).await?;
    let product = inventory::find_active_product(db, &item.product_id).await?;
    if product.stock < new_count {
        return Err(shortage(&product, new_count));
    }

    let cart_id = item.cart_id.clone();
    let mut item: cart_item::ActiveModel = item.into();
    item.quantity = Set(new_count);
    item.line_total = Set(Money::from_satang(product.price).times(new_count).satang());
    item.update(db).await?;

    let total = recalculate_cart_total(db, &cart_id).await?;
    Ok(Mutation::new(total, cart_events(&user.id)))
}

/// Removes one of the caller's cart lines.
#[instrument(skip(db, user))]
pub async fn remove_from_cart(
    db: &DatabaseConnection,
    user: Option<&User>,
    cart_item_id: &str,
) -> Result<Mutation<Money>> {
    let user = authorize(user, can_update_user_cart)?;
    let item = owned_item(db, user, cart_item_id).await?;
    let cart_id = item.cart_id.clone();

    item.delete(db).await?;

    let total = recalculate_cart_total(db, &cart_id).await?;
    Ok(Mutation::new(total, cart_events(&user.id)))
}

/// Empties the caller's cart and resets its total to zero. A user without a cart
/// already has an empty one, so this always succeeds for them.
#[instrument(skip(db, user))]
pub async fn clear_cart(db: &DatabaseConnection, user: Option<&User>) -> Result<Mutation<Money>> {
    let user = authorize(user, can_update_user_cart)?;
    let events = cart_events(&user.id);

    let Some(cart) = find_cart(db, &user.id).await? else {
        debug!("User {} has no cart to clear", user.id);
        return Ok(Mutation::new(Money::ZERO, events));
    };

    let txn = db.begin().await?;
    CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart.id.as_str()))
        .exec(&txn)
        .await?;
    let total = recalculate_cart_total(&txn, &cart.id).await?;
    txn.commit().await?;

    Ok(Mutation::new(total, events))
}
