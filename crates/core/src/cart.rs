//! The in-progress order aggregate.
//!
//! A [`Cart`] is the order being assembled before submission: a list of
//! line items unique by menu item id, plus the pickup/delivery selection.
//! All operations are pure state changes on the aggregate; where it is
//! persisted (a server session, a test vector) is the caller's concern,
//! which keeps the cart unit-testable without any storage attached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::money;
use crate::types::order::{LineItem, OrderType};

/// The order a customer is assembling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<LineItem>,
    order_type: OrderType,
}

/// Totals over a cart: item count and price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Sum of quantities across all line items.
    pub item_count: u32,
    /// Sum of price times quantity across all line items, at 2 decimals.
    pub total: Decimal,
}

impl Cart {
    /// An empty pickup cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The selected order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of a menu item.
    ///
    /// If the item is already in the cart its quantity goes up by one;
    /// otherwise it is appended with quantity 1. Ids stay unique within
    /// the cart either way.
    pub fn add_item(&mut self, id: &str, name: &str, price: Decimal) {
        if let Some(existing) = self.items.iter_mut().find(|item| item.id == id) {
            existing.quantity += 1;
        } else {
            self.items.push(LineItem {
                id: id.to_owned(),
                name: name.to_owned(),
                price,
                quantity: 1,
            });
        }
    }

    /// Increase the quantity of an item already in the cart by one.
    ///
    /// Unknown ids are ignored.
    pub fn increment(&mut self, id: &str) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.quantity += 1;
        }
    }

    /// Decrease the quantity of an item by one, removing the line entirely
    /// when it would drop below 1.
    pub fn decrement(&mut self, id: &str) {
        let Some(pos) = self.items.iter().position(|item| item.id == id) else {
            return;
        };
        match self.items.get_mut(pos) {
            Some(item) if item.quantity > 1 => item.quantity -= 1,
            _ => {
                self.items.remove(pos);
            }
        }
    }

    /// Remove an item unconditionally.
    pub fn remove(&mut self, id: &str) {
        self.items.retain(|item| item.id != id);
    }

    /// Select pickup or delivery.
    pub const fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
    }

    /// Totals for display: item count and price at 2 decimals.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.items.iter().map(|item| item.quantity).sum(),
            total: money::order_total(&self.items),
        }
    }

    /// Drop every item; the order-type selection survives, matching how a
    /// customer who just ordered pickup will likely order pickup again.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn eur(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn adding_same_id_twice_increments_quantity() {
        let mut cart = Cart::new();
        cart.add_item("pad-thai", "Pad Thai", eur("12.50"));
        cart.add_item("pad-thai", "Pad Thai", eur("12.50"));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn decrementing_quantity_one_removes_the_line() {
        let mut cart = Cart::new();
        cart.add_item("tom-yum", "Tom Yum", eur("8.00"));
        cart.decrement("tom-yum");

        assert!(cart.is_empty());
    }

    #[test]
    fn decrement_keeps_line_above_one_unit() {
        let mut cart = Cart::new();
        cart.add_item("tom-yum", "Tom Yum", eur("8.00"));
        cart.increment("tom-yum");
        cart.decrement("tom-yum");

        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn remove_drops_the_line_regardless_of_quantity() {
        let mut cart = Cart::new();
        cart.add_item("pad-thai", "Pad Thai", eur("12.50"));
        cart.increment("pad-thai");
        cart.remove("pad-thai");

        assert!(cart.is_empty());
    }

    #[test]
    fn increment_of_unknown_id_is_ignored() {
        let mut cart = Cart::new();
        cart.increment("never-added");
        assert!(cart.is_empty());
    }

    #[test]
    fn summary_counts_units_and_sums_prices() {
        let mut cart = Cart::new();
        cart.add_item("pad-thai", "Pad Thai", eur("12.50"));
        cart.increment("pad-thai");
        cart.add_item("tom-yum", "Tom Yum", eur("8.00"));

        let summary = cart.summary();
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.total, eur("33.00"));
    }

    #[test]
    fn order_type_defaults_to_pickup() {
        assert_eq!(Cart::new().order_type(), OrderType::Pickup);
    }

    #[test]
    fn clear_empties_items_but_keeps_order_type() {
        let mut cart = Cart::new();
        cart.set_order_type(OrderType::Delivery);
        cart.add_item("pad-thai", "Pad Thai", eur("12.50"));
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.order_type(), OrderType::Delivery);
    }
}
