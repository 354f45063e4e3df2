//! Core types for Lemongrass.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order;

pub use email::{Email, EmailError};
pub use id::OrderId;
pub use money::{format_eur, line_total, order_total};
pub use order::{LineItem, Order, OrderDraft, OrderStatus, OrderType, StatusWrite};
