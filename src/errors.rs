//! Unified error types and result handling.
//!
//! Domain variants render the localized, user-facing message through `Display`.
//! Database and I/O failures keep their internal detail for logging only; the
//! storefront boundary never shows them to a customer.

use crate::core::order::OrderStatus;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Every failure the storefront can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// Submitted form data did not pass validation
    #[error("กรุณากรอกข้อมูลให้ถูกต้อง")]
    Validation {
        /// Messages per offending field
        field_errors: FieldErrors,
    },

    /// No signed-in user; the caller decides whether to redirect or return 401
    #[error("กรุณาเข้าสู่ระบบก่อนทำรายการ")]
    Unauthenticated,

    /// Signed-in user lacks the capability or does not own the resource
    #[error("คุณไม่มีสิทธิ์ทำรายการนี้")]
    Forbidden,

    #[error("ไม่พบสินค้าหรือไม่มีจำหน่าย")]
    ProductNotFound { product_id: String },

    #[error("ไม่พบหมวดหมู่สินค้าหรือหมวดหมู่ถูกปิดใช้งาน")]
    CategoryNotFound { category_id: String },

    #[error("ไม่พบสินค้าในตะกร้า")]
    CartItemNotFound { cart_item_id: String },

    #[error("ไม่พบคำสั่งซื้อ")]
    OrderNotFound { order_id: String },

    /// Requested quantity exceeds live stock. `title` is set when the shortage is
    /// reported against a named product during checkout.
    #[error("{}", shortage_message(.title.as_deref()))]
    InsufficientStock {
        product_id: String,
        title: Option<String>,
        requested: i32,
        available: i32,
    },

    #[error("ไม่มีสินค้าในตะกร้า")]
    EmptyCart,

    #[error("จำนวนสินค้าต้องมีอย่างน้อย 1 ชิ้น")]
    InvalidQuantity { quantity: i32 },

    #[error("จำนวนเงินไม่ถูกต้อง")]
    InvalidAmount { amount: Decimal },

    #[error("ไม่สามารถเปลี่ยนสถานะคำสั่งซื้อจาก \"{from}\" เป็น \"{to}\" ได้")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },

    /// A stored row holds a value the code does not recognise
    #[error("Invalid stored data: {message}")]
    InvalidData { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn shortage_message(title: Option<&str>) -> String {
    title.map_or_else(
        || "สต๊อกสินค้าไม่เพียงพอ".to_string(),
        |title| format!("สินค้า {title} มีไม่เพียงพอ"),
    )
}

/// Coarse classification of [`Error`] used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ValidationError,
    Unauthenticated,
    NotFound,
    Forbidden,
    InsufficientStock,
    EmptyCart,
    InvalidQuantity,
    InvalidStateTransition,
    ConfigurationError,
    UnexpectedError,
}

impl Error {
    /// Maps the error onto the public taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidAmount { .. } => ErrorKind::ValidationError,
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::ProductNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::CartItemNotFound { .. }
            | Self::OrderNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::EmptyCart => ErrorKind::EmptyCart,
            Self::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            Self::InvalidStateTransition { .. } => ErrorKind::InvalidStateTransition,
            Self::Config { .. } => ErrorKind::ConfigurationError,
            Self::InvalidData { .. } | Self::Database(_) | Self::Io(_) => {
                ErrorKind::UnexpectedError
            }
        }
    }

    /// Whether the message carries internal detail that must not reach a customer.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConfigurationError | ErrorKind::UnexpectedError
        )
    }

    /// Builds a validation error for a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(field.to_string(), vec![message.into()]);
        Self::Validation { field_errors }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_names_product_when_known() {
        let err = Error::InsufficientStock {
            product_id: "p1".to_string(),
            title: Some("เสื้อยืด".to_string()),
            requested: 2,
            available: 1,
        };
        assert_eq!(err.to_string(), "สินค้า เสื้อยืด มีไม่เพียงพอ");

        let err = Error::InsufficientStock {
            product_id: "p1".to_string(),
            title: None,
            requested: 3,
            available: 2,
        };
        assert_eq!(err.to_string(), "สต๊อกสินค้าไม่เพียงพอ");
    }

    #[test]
    fn test_internal_errors_are_flagged() {
        let err = Error::Database(DbErr::Custom("disk I/O".to_string()));
        assert_eq!(err.kind(), ErrorKind::UnexpectedError);
        assert!(err.is_internal());

        let err = Error::Config {
            message: "PROMPTPAY_ID is not set".to_string(),
        };
        assert!(err.is_internal());

        let err = Error::InvalidData {
            message: "unknown order status `Refunded`".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::UnexpectedError);
        assert!(err.is_internal());

        assert!(!Error::EmptyCart.is_internal());
        assert_eq!(Error::EmptyCart.kind(), ErrorKind::EmptyCart);
    }

    #[test]
    fn test_field_builds_single_field_validation() {
        match Error::field("phone", "กรุณากรอกเบอร์โทรศัพท์") {
            Error::Validation { field_errors } => {
                assert_eq!(
                    field_errors.get("phone"),
                    Some(&vec!["กรุณากรอกเบอร์โทรศัพท์".to_string()])
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
