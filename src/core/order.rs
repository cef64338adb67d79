//! Order business logic - lifecycle of a placed order.
//!
//! Orders are created by checkout and never deleted. After creation only the status
//! and tracking number change; totals and item snapshots stay as they were written.

use crate::{
    cache::{CacheEvent, CacheTag, Mutation},
    core::{
        auth::{User, authorize, can_create_order, can_manage_orders},
        money::Money,
    },
    entities::{Order, OrderItem, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{info, instrument};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Name stored in the `orders.status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Label shown to customers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "รอชำระเงิน",
            Self::Paid => "ชำระเงินแล้ว",
            Self::Shipped => "กำลังจัดส่ง",
            Self::Delivered => "จัดส่งสำเร็จ",
            Self::Cancelled => "ยกเลิก",
        }
    }

    /// Whether an order in this status may move to `next`.
    ///
    /// ```text
    /// Pending -> Paid -> Shipped -> Delivered
    ///    |        |
    ///    +--------+--> Cancelled
    /// ```
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Cancelled)
                | (Self::Paid, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Paid" => Ok(Self::Paid),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            other => Err(Error::InvalidData {
                message: format!("unknown order status `{other}`"),
            }),
        }
    }
}

/// A purchased line as it was at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub id: String,
    pub quantity: i32,
    pub unit_price: Money,
    pub line_total: Money,
    pub product_title: String,
    pub product_image: Option<String>,
    pub product_id: Option<String>,
}

impl From<order_item::Model> for OrderLine {
    fn from(item: order_item::Model) -> Self {
        Self {
            id: item.id,
            quantity: item.quantity,
            unit_price: Money::from_satang(item.unit_price),
            line_total: Money::from_satang(item.line_total),
            product_title: item.product_title,
            product_image: item.product_image,
            product_id: item.product_id,
        }
    }
}

/// An order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    pub id: String,
    pub order_number: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub shipping_fee: Money,
    pub address: String,
    pub phone: String,
    pub note: Option<String>,
    pub tracking_number: Option<String>,
    pub customer_id: String,
    pub created_at: DateTimeUtc,
    pub items: Vec<OrderLine>,
}

impl OrderView {
    fn build(order: order::Model, items: Vec<order_item::Model>) -> Result<Self> {
        Ok(Self {
            status: order.status.parse()?,
            total_amount: Money::from_satang(order.total_amount),
            shipping_fee: Money::from_satang(order.shipping_fee),
            items: items.into_iter().map(OrderLine::from).collect(),
            id: order.id,
            order_number: order.order_number,
            address: order.address,
            phone: order.phone,
            note: order.note,
            tracking_number: order.tracking_number,
            customer_id: order.customer_id,
            created_at: order.created_at,
        })
    }
}

/// Tags to invalidate after an order is created or changes status.
#[must_use]
pub fn order_events(order_id: &str, customer_id: &str) -> Vec<CacheEvent> {
    vec![
        CacheEvent::Invalidate(CacheTag::Order(order_id.to_string())),
        CacheEvent::Invalidate(CacheTag::CustomerOrders(customer_id.to_string())),
    ]
}

/// Loads an order row.
///
/// # Errors
/// `OrderNotFound` when it does not exist.
pub async fn find_order<C>(db: &C, order_id: &str) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            order_id: order_id.to_string(),
        })
}

async fn order_items(db: &DatabaseConnection, order_id: &str) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::ProductTitle)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads an order for its customer or for an admin.
///
/// # Errors
/// - `Unauthenticated` without a user
/// - `OrderNotFound` when it does not exist
/// - `Forbidden` when the caller is neither the owner nor an admin
pub async fn get_order(
    db: &DatabaseConnection,
    user: Option<&User>,
    order_id: &str,
) -> Result<OrderView> {
    let user = user.ok_or(Error::Unauthenticated)?;
    let order = find_order(db, order_id).await?;
    if order.customer_id != user.id && !can_manage_orders(user) {
        return Err(Error::Forbidden);
    }

    let items = order_items(db, &order.id).await?;
    OrderView::build(order, items)
}

/// Lists the caller's orders, newest first.
pub async fn list_customer_orders(
    db: &DatabaseConnection,
    user: Option<&User>,
) -> Result<Vec<OrderView>> {
    let user = authorize(user, can_create_order)?;

    let orders = Order::find()
        .filter(order::Column::CustomerId.eq(user.id.as_str()))
        .order_by_desc(order::Column::CreatedAt)
        .all(db)
        .await?;

    let order_ids: Vec<String> = orders.iter().map(|order| order.id.clone()).collect();
    let mut items: HashMap<String, Vec<order_item::Model>> = HashMap::new();
    for item in OrderItem::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .order_by_asc(order_item::Column::ProductTitle)
        .all(db)
        .await?
    {
        items.entry(item.order_id.clone()).or_default().push(item);
    }

    orders
        .into_iter()
        .map(|order| {
            let order_items = items.remove(&order.id).unwrap_or_default();
            OrderView::build(order, order_items)
        })
        .collect()
}

/// Moves an order from `from` to `to`, guarded on the stored status so a concurrent
/// change in between is reported rather than overwritten.
async fn transition(
    db: &DatabaseConnection,
    order: &order::Model,
    from: OrderStatus,
    to: OrderStatus,
    tracking_number: Option<String>,
) -> Result<order::Model> {
    let mut update = Order::update_many()
        .col_expr(order::Column::Status, Expr::value(to.as_str()))
        .col_expr(order::Column::UpdatedAt, Expr::value(chrono::Utc::now()));
    if let Some(tracking_number) = tracking_number {
        update = update.col_expr(order::Column::TrackingNumber, Expr::value(tracking_number));
    }

    let result = update
        .filter(order::Column::Id.eq(order.id.as_str()))
        .filter(order::Column::Status.eq(from.as_str()))
        .exec(db)
        .await?;

    let current = find_order(db, &order.id).await?;
    if result.rows_affected == 0 {
        return Err(Error::InvalidStateTransition {
            from: current.status.parse()?,
            to,
        });
    }
    Ok(current)
}

/// Cancels one of the caller's own orders. Only pending orders can be cancelled
/// here; stock is not returned.
///
/// # Errors
/// - `OrderNotFound` / `Forbidden` when the order is missing or not the caller's
/// - `InvalidStateTransition` when the order is no longer pending
#[instrument(skip(db, user))]
pub async fn cancel_order(
    db: &DatabaseConnection,
    user: Option<&User>,
    order_id: &str,
) -> Result<Mutation<order::Model>> {
    let user = authorize(user, can_create_order)?;
    let order = find_order(db, order_id).await?;
    if order.customer_id != user.id {
        return Err(Error::Forbidden);
    }

    let status: OrderStatus = order.status.parse()?;
    if status != OrderStatus::Pending {
        return Err(Error::InvalidStateTransition {
            from: status,
            to: OrderStatus::Cancelled,
        });
    }

    let cancelled = transition(db, &order, status, OrderStatus::Cancelled, None).await?;
    info!("Order {} cancelled by customer {}", cancelled.order_number, user.id);

    let events = order_events(&cancelled.id, &cancelled.customer_id);
    Ok(Mutation::new(cancelled, events))
}

/// Moves an order through fulfilment and optionally records a tracking number.
///
/// Passing the current status with a tracking number only updates the tracking
/// number. Blank tracking numbers are ignored.
///
/// # Errors
/// - `Unauthenticated` / `Forbidden` unless the caller manages orders
/// - `OrderNotFound` when it does not exist
/// - `InvalidStateTransition` when `status` is not reachable from the current status
#[instrument(skip(db, user))]
pub async fn update_order_status(
    db: &DatabaseConnection,
    user: Option<&User>,
    order_id: &str,
    status: OrderStatus,
    tracking_number: Option<&str>,
) -> Result<Mutation<order::Model>> {
    authorize(user, can_manage_orders)?;
    let order = find_order(db, order_id).await?;

    let current: OrderStatus = order.status.parse()?;
    if status != current && !current.can_transition_to(status) {
        return Err(Error::InvalidStateTransition {
            from: current,
            to: status,
        });
    }

    let tracking_number = tracking_number
        .map(str::trim)
        .filter(|tracking| !tracking.is_empty())
        .map(str::to_string);
    let updated = transition(db, &order, current, status, tracking_number).await?;
    info!(
        "Order {} moved from {} to {}",
        updated.order_number,
        current.as_str(),
        status.as_str()
    );

    let events = order_events(&updated.id, &updated.customer_id);
    Ok(Mutation::new(updated, events))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::auth::Role;
    use crate::test_utils::*;
    use sea_orm::{ActiveModelTrait, Set};

    #[test]
    fn test_status_transitions() {
        use OrderStatus::*;

        let allowed = [
            (Pending, Paid),
            (Pending, Cancelled),
            (Paid, Shipped),
            (Paid, Cancelled),
            (Shipped, Delivered),
        ];
        for from in [Pending, Paid, Shipped, Delivered, Cancelled] {
            for to in [Pending, Paid, Shipped, Delivered, Cancelled] {
                assert_eq!(
                    from.can_transition_to(to),
                    allowed.contains(&(from, to)),
                    "{from:?} -> {to:?}"
                );
            }
        }
        assert!(Delivered.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Shipped.is_terminal());
    }

    #[test]
    fn test_status_storage_names_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().ok(), Some(status));
        }
        let err = "Refunded".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, Error::InvalidData { .. }));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_customer_cancels_pending_order() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "buyer@example.com").await?;
        let order = create_test_order(&db, &customer.id, OrderStatus::Pending).await?;

        let cancelled = cancel_order(&db, Some(&customer), &order.id).await?;
        assert_eq!(cancelled.value.status, OrderStatus::Cancelled.as_str());
        assert_eq!(cancelled.value.total_amount, order.total_amount);
        assert_eq!(cancelled.events, order_events(&order.id, &customer.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_rejects_non_pending_orders() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "buyer@example.com").await?;
        let order = create_test_order(&db, &customer.id, OrderStatus::Paid).await?;

        match cancel_order(&db, Some(&customer), &order.id).await {
            Err(err @ Error::InvalidStateTransition { .. }) => {
                assert_eq!(
                    err.to_string(),
                    "ไม่สามารถเปลี่ยนสถานะคำสั่งซื้อจาก \"ชำระเงินแล้ว\" เป็น \"ยกเลิก\" ได้"
                );
            }
            other => panic!("expected InvalidStateTransition, got {other:?}"),
        }

        let stored = find_order(&db, &order.id).await?;
        assert_eq!(stored.status, OrderStatus::Paid.as_str());
        Ok(())
    }

    #[tokio::test]
    async fn test_orders_are_private_to_their_customer() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_customer(&db, "owner@example.com").await?;
        let other = create_test_customer(&db, "other@example.com").await?;
        let order = create_test_order(&db, &owner.id, OrderStatus::Pending).await?;

        assert!(matches!(
            get_order(&db, Some(&other), &order.id).await,
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            cancel_order(&db, Some(&other), &order.id).await,
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            get_order(&db, None, &order.id).await,
            Err(Error::Unauthenticated)
        ));

        let admin = test_user(Role::Admin);
        let view = get_order(&db, Some(&admin), &order.id).await?;
        assert_eq!(view.customer_id, owner.id);
        assert_eq!(view.items.len(), 1);

        assert!(matches!(
            get_order(&db, Some(&owner), "missing").await,
            Err(Error::OrderNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_moves_order_through_fulfilment() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "buyer@example.com").await?;
        let admin = test_user(Role::Admin);
        let order = create_test_order(&db, &customer.id, OrderStatus::Pending).await?;

        assert!(matches!(
            update_order_status(&db, Some(&customer), &order.id, OrderStatus::Paid, None).await,
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            update_order_status(&db, Some(&admin), &order.id, OrderStatus::Delivered, None).await,
            Err(Error::InvalidStateTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            })
        ));

        update_order_status(&db, Some(&admin), &order.id, OrderStatus::Paid, None).await?;
        let shipped = update_order_status(
            &db,
            Some(&admin),
            &order.id,
            OrderStatus::Shipped,
            Some(" TH123456789 "),
        )
        .await?;
        assert_eq!(shipped.value.tracking_number.as_deref(), Some("TH123456789"));

        let delivered =
            update_order_status(&db, Some(&admin), &order.id, OrderStatus::Delivered, Some(""))
                .await?;
        assert_eq!(delivered.value.status, OrderStatus::Delivered.as_str());
        assert_eq!(delivered.value.tracking_number.as_deref(), Some("TH123456789"));
        assert_eq!(delivered.value.total_amount, order.total_amount);
        assert_eq!(delivered.value.shipping_fee, order.shipping_fee);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_customer_orders_newest_first() -> Result<()> {
        let db = setup_test_db().await?;
        let customer = create_test_customer(&db, "buyer@example.com").await?;
        let other = create_test_customer(&db, "other@example.com").await?;

        let older = create_test_order(&db, &customer.id, OrderStatus::Delivered).await?;
        let mut backdated: order::ActiveModel = older.clone().into();
        backdated.created_at = Set(older.created_at - chrono::Duration::hours(1));
        backdated.update(&db).await?;

        let newer = create_test_order(&db, &customer.id, OrderStatus::Pending).await?;
        create_test_order(&db, &other.id, OrderStatus::Pending).await?;

        let orders = list_customer_orders(&db, Some(&customer)).await?;
        let ids: Vec<&str> = orders.iter().map(|order| order.id.as_str()).collect();
        assert_eq!(ids, [newer.id.as_str(), older.id.as_str()]);
        assert_eq!(orders[1].status, OrderStatus::Delivered);
        assert_eq!(orders[0].items.len(), 1);
        Ok(())
    }
}
