//! PromptPay payment references.
//!
//! Produces the `promptpay.io` URL a QR renderer turns into a scannable code. No
//! payment is processed here.

use crate::{
    core::{
        auth::{User, authorize, can_create_order},
        money::Money,
        order::{self, OrderStatus},
    },
    errors::{Error, Result},
};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::DatabaseConnection;

const PROMPTPAY_BASE_URL: &str = "https://promptpay.io";

/// Builds the PromptPay URL for `amount` baht, formatted with exactly two decimals.
///
/// # Errors
/// - `Config` when no merchant id is configured
/// - `InvalidAmount` for negative amounts
pub fn generate_promptpay_qr(amount: Decimal, merchant_id: Option<&str>) -> Result<String> {
    let merchant_id = merchant_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::Config {
            message: "PromptPay merchant id is not configured".to_string(),
        })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::InvalidAmount { amount });
    }

    let mut formatted = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    formatted.rescale(2);

    Ok(format!("{PROMPTPAY_BASE_URL}/{merchant_id}/{formatted}"))
}

/// Payment URL for one of the caller's pending orders, for its full total.
///
/// # Errors
/// - `OrderNotFound` / `Forbidden` when the order is missing or not the caller's
/// - `InvalidStateTransition` when the order is no longer awaiting payment
/// - `Config` when no merchant id is configured
pub async fn payment_qr_for_order(
    db: &DatabaseConnection,
    user: Option<&User>,
    order_id: &str,
    merchant_id: Option<&str>,
) -> Result<String> {
    let user = authorize(user, can_create_order)?;
    let order = order::find_order(db, order_id).await?;
    if order.customer_id != user.id {
        return Err(Error::Forbidden);
    }

    let status: OrderStatus = order.status.parse()?;
    if status != OrderStatus::Pending {
        return Err(Error::InvalidStateTransition {
            from: status,
            to: OrderStatus::Paid,
        });
    }

    generate_promptpay_qr(
        Money::from_satang(order.total_amount).to_decimal(),
        merchant_id,
    )
}
