//! Core business logic, independent of any web framework.
//!
//! Every operation takes the database connection and the signed-in user explicitly
//! and returns a typed [`crate::errors::Result`]. Mutations return a
//! [`crate::cache::Mutation`] carrying the cache tags to invalidate once they have
//! committed.

/// Signed-in user model and capability checks
pub mod auth;
/// Per-user shopping cart
pub mod cart;
/// Product categories and seeding
pub mod category;
/// Cart to order conversion
pub mod checkout;
/// Product stock, prices and catalog reads
pub mod inventory;
/// Fixed-point baht amounts
pub mod money;
/// Order lifecycle
pub mod order;
/// PromptPay payment references
pub mod payment;
