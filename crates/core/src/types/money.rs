//! Currency arithmetic for order totals.
//!
//! All amounts are euro values with two fractional digits, held as
//! [`Decimal`] so that summing line items never drifts the way binary
//! floats would. The payment provider wants amounts as exact two-decimal
//! strings, which [`format_eur`] produces.

use rust_decimal::Decimal;

use super::order::LineItem;

/// Number of fractional digits in a currency amount.
pub const CURRENCY_SCALE: u32 = 2;

/// The total for a single line: unit price times quantity, at currency scale.
#[must_use]
pub fn line_total(item: &LineItem) -> Decimal {
    (item.price * Decimal::from(item.quantity)).round_dp(CURRENCY_SCALE)
}

/// Sum of all line totals, at currency scale.
#[must_use]
pub fn order_total(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(line_total)
        .sum::<Decimal>()
        .round_dp(CURRENCY_SCALE)
}

/// Format an amount the way the payment provider expects it: a plain
/// decimal string with exactly two fractional digits, e.g. `"33.00"`.
#[must_use]
pub fn format_eur(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(CURRENCY_SCALE))
}
