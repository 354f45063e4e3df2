//! The order entity, its line items, and the status machine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::OrderId;

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    #[default]
    Pickup,
    Delivery,
}

/// Lifecycle status of an order.
///
/// The ordering flow itself only ever writes `Pending`, `Paid`, and
/// `Cancelled`; `Confirmed`, `Ready`, and `Completed` are reserved for
/// staff-facing tooling.
///
/// Transitions form a strict chain with one early exit:
///
/// ```text
/// pending -> paid -> confirmed -> ready -> completed
///        \-> cancelled
/// ```
///
/// Every target status has exactly one legal predecessor, which the
/// repository checks before overwriting (see [`OrderStatus::predecessor`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Confirmed,
    Ready,
    Completed,
    Cancelled,
}

/// Relationship between a requested status write and the status an order
/// currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusWrite {
    /// The single legal next step from the current status.
    Apply,
    /// The order already holds the requested status, so there is nothing
    /// to do. A redelivered payment webhook produces exactly this.
    AlreadyApplied,
    /// The current status does not allow the write.
    Illegal,
}

impl OrderStatus {
    /// The status an order must currently hold for a write to `self` to be
    /// legal. `Pending` is only ever set at creation, never by transition.
    #[must_use]
    pub const fn predecessor(self) -> Option<Self> {
        match self {
            Self::Pending => None,
            Self::Paid | Self::Cancelled => Some(Self::Pending),
            Self::Confirmed => Some(Self::Paid),
            Self::Ready => Some(Self::Confirmed),
            Self::Completed => Some(Self::Ready),
        }
    }

    /// Classify a request to write `next` onto an order currently in `self`.
    #[must_use]
    pub fn classify_write(self, next: Self) -> StatusWrite {
        if self == next {
            StatusWrite::AlreadyApplied
        } else if next.predecessor() == Some(self) {
            StatusWrite::Apply
        } else {
            StatusWrite::Illegal
        }
    }

    /// Whether an order in `self` may move to `next`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.classify_write(next) == StatusWrite::Apply
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Confirmed => "confirmed",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// One dish on an order, at the menu price it was sold for.
///
/// Line items are stored as a structured blob on the order row, never as
/// rows of their own; quantities are at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Menu item id, unique within one order.
    pub id: String,
    /// Dish name as shown on the menu.
    pub name: String,
    /// Unit price in euro.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Number of units ordered.
    pub quantity: u32,
}

/// A validated order ready to be inserted, before the storage layer has
/// assigned its display number and timestamps.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: OrderId,
    pub order_type: OrderType,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<Email>,
    pub customer_address: Option<String>,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub notes: Option<String>,
}

/// A persisted order as read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Monotonically increasing display sequence; cosmetic, never used for
    /// identity or lookups.
    pub order_number: i32,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<Email>,
    pub customer_address: Option<String>,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    /// External payment-session identifier, set once the payment provider
    /// has created a session for this order.
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
