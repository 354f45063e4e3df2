//! Order submission flow.
//!
//! `create_order` runs the whole sequence for one submission: validate the
//! payload, price the items from the menu, persist the order as pending,
//! open a payment session, attach the payment reference, and hand back
//! either the checkout URL or a test-mode confirmation. Each step is a
//! single awaited call; a failure surfaces immediately, nothing is retried.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use lemongrass_core::{
    Email, LineItem, OrderDraft, OrderId, OrderStatus, OrderType, money,
};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::menu::Menu;
use crate::services::mollie::PaymentStatus;
use crate::state::AppState;

/// Payment description shown on the customer's bank statement.
const PAYMENT_DESCRIPTION: &str = "Lemongrass - online order";

/// A submitted order, as posted by the cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

/// What a successful submission returns to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderOutcome {
    pub order_id: OrderId,
    /// Hosted checkout page to redirect to; absent in test mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,
    /// Test-mode confirmation; absent when a payment session was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Validate a submission and price it from the menu.
///
/// Fails without side effects on a missing required field, an unknown
/// item, a zero quantity, or a submitted unit price that disagrees with
/// the menu. The draft's line items carry the menu's name and price, so a
/// stale or tampered client can never set what an order costs.
///
/// # Errors
///
/// Returns `AppError::Validation` describing the first problem found.
pub fn build_draft(menu: &Menu, request: &CreateOrderRequest) -> Result<OrderDraft> {
    let customer_name = request.customer_name.trim();
    if customer_name.is_empty() {
        return Err(AppError::Validation("Please fill in your name.".to_owned()));
    }

    let customer_phone = request.customer_phone.trim();
    if customer_phone.is_empty() {
        return Err(AppError::Validation(
            "Please fill in your phone number.".to_owned(),
        ));
    }

    if request.items.is_empty() {
        return Err(AppError::Validation("Your cart is empty.".to_owned()));
    }

    let customer_address = request
        .customer_address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(ToOwned::to_owned);

    if request.order_type == OrderType::Delivery && customer_address.is_none() {
        return Err(AppError::Validation(
            "Please fill in your delivery address.".to_owned(),
        ));
    }

    let customer_email = request
        .customer_email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::Validation(format!("Invalid email address: {e}.")))?;

    let items = price_items(menu, &request.items)?;
    let subtotal = money::order_total(&items);

    Ok(OrderDraft {
        id: OrderId::generate(),
        order_type: request.order_type,
        customer_name: customer_name.to_owned(),
        customer_phone: customer_phone.to_owned(),
        customer_email,
        customer_address,
        items,
        subtotal,
        // No tax, fees or discounts: the total is the subtotal.
        total: subtotal,
        notes: request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|notes| !notes.is_empty())
            .map(ToOwned::to_owned),
    })
}

/// Resolve submitted line items against the authoritative menu.
fn price_items(menu: &Menu, items: &[LineItem]) -> Result<Vec<LineItem>> {
    items
        .iter()
        .map(|item| {
            let menu_item = menu.item(&item.id).ok_or_else(|| {
                AppError::Validation(format!("Unknown menu item: {}.", item.id))
            })?;

            if item.quantity < 1 {
                return Err(AppError::Validation(format!(
                    "Quantity for {} must be at least 1.",
                    menu_item.name
                )));
            }

            if item.price.round_dp(money::CURRENCY_SCALE) != menu_item.price {
                return Err(AppError::Validation(format!(
                    "The price of {} has changed, please refresh the menu.",
                    menu_item.name
                )));
            }

            Ok(LineItem {
                id: menu_item.id.clone(),
                name: menu_item.name.clone(),
                price: menu_item.price,
                quantity: item.quantity,
            })
        })
        .collect()
}

/// The order status a provider payment status maps to.
///
/// `None` means the notification is a no-op for us: the payment is still
/// in flight and the order stays pending.
#[must_use]
pub const fn order_status_for(payment_status: PaymentStatus) -> Option<OrderStatus> {
    match payment_status {
        PaymentStatus::Paid => Some(OrderStatus::Paid),
        PaymentStatus::Failed | PaymentStatus::Expired | PaymentStatus::Canceled => {
            Some(OrderStatus::Cancelled)
        }
        PaymentStatus::Open | PaymentStatus::Pending | PaymentStatus::Authorized => None,
    }
}

/// Run one order submission end to end.
///
/// # Errors
///
/// Returns `AppError::Validation` for a bad payload (no side effects),
/// or a `Database`/`Payment` error from the insert or session creation.
#[instrument(skip(state, request), fields(order_type = ?request.order_type))]
pub async fn create_order(
    state: &AppState,
    request: CreateOrderRequest,
) -> Result<CreateOrderOutcome> {
    let draft = build_draft(state.menu(), &request)?;
    let order_id = draft.id;

    // Demo mode: accept the order without persisting it.
    if let Some(pool) = state.pool() {
        OrderRepository::new(pool).insert(&draft).await?;
        tracing::info!(%order_id, total = %draft.total, "Order persisted");
    } else {
        tracing::warn!(%order_id, "No database configured, order not persisted");
    }

    let Some(mollie) = state.mollie() else {
        // Test mode: no payment provider, confirm directly.
        return Ok(CreateOrderOutcome {
            order_id,
            checkout_url: None,
            message: Some("Order received (test mode - no payment).".to_owned()),
        });
    };

    let base_url = state.config().base_url.trim_end_matches('/');
    let redirect_url = format!("{base_url}/order/confirmation?order={order_id}");
    let webhook_url = format!("{base_url}/api/orders/webhook");

    let payment = mollie
        .create_payment(
            order_id,
            draft.total,
            PAYMENT_DESCRIPTION,
            &redirect_url,
            &webhook_url,
        )
        .await?;

    if let Some(pool) = state.pool() {
        OrderRepository::new(pool)
            .set_payment_reference(order_id, &payment.id)
            .await?;
    }

    tracing::info!(%order_id, payment_id = %payment.id, "Payment session created");

    Ok(CreateOrderOutcome {
        order_id,
        checkout_url: Some(payment.checkout_url),
        message: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::menu::MenuData;

    fn menu() -> Menu {
        let data: MenuData = serde_json::from_str(
            r#"{
                "categories": [{
                    "id": "all",
                    "name": "All",
                    "items": [
                        {"id": "pad-thai", "name": "Pad Thai", "price": "12.50"},
                        {"id": "tom-yum", "name": "Tom Yum", "price": "8.00"}
                    ]
                }]
            }"#,
        )
        .unwrap();
        Menu::from_data(data).unwrap()
    }

    fn request() -> CreateOrderRequest {
        serde_json::from_value(serde_json::json!({
            "type": "pickup",
            "customerName": "Alice",
            "customerPhone": "+32 470 12 34 56",
            "items": [
                {"id": "pad-thai", "name": "Pad Thai", "price": 12.50, "quantity": 2},
                {"id": "tom-yum", "name": "Tom Yum", "price": 8.00, "quantity": 1}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn totals_follow_the_menu() {
        let draft = build_draft(&menu(), &request()).unwrap();
        assert_eq!(draft.subtotal, "33.00".parse().unwrap());
        assert_eq!(draft.total, draft.subtotal);
        assert_eq!(draft.items.len(), 2);
    }

    #[test]
    fn delivery_without_address_is_rejected() {
        let mut req = request();
        req.order_type = OrderType::Delivery;
        assert!(matches!(
            build_draft(&menu(), &req),
            Err(AppError::Validation(msg)) if msg.contains("delivery address")
        ));
    }

    #[test]
    fn delivery_with_address_is_accepted() {
        let mut req = request();
        req.order_type = OrderType::Delivery;
        req.customer_address = Some("Stationsstraat 1, Sint-Niklaas".to_owned());
        let draft = build_draft(&menu(), &req).unwrap();
        assert_eq!(draft.order_type, OrderType::Delivery);
    }

    #[test]
    fn empty_items_are_rejected() {
        let mut req = request();
        req.items.clear();
        assert!(matches!(
            build_draft(&menu(), &req),
            Err(AppError::Validation(msg)) if msg.contains("empty")
        ));
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut req = request();
        req.customer_name = "   ".to_owned();
        assert!(build_draft(&menu(), &req).is_err());
    }

    #[test]
    fn unknown_menu_item_is_rejected() {
        let mut req = request();
        req.items[0].id = "sushi".to_owned();
        assert!(matches!(
            build_draft(&menu(), &req),
            Err(AppError::Validation(msg)) if msg.contains("Unknown menu item")
        ));
    }

    #[test]
    fn client_price_disagreeing_with_menu_is_rejected() {
        let mut req = request();
        req.items[0].price = "0.01".parse().unwrap();
        assert!(matches!(
            build_draft(&menu(), &req),
            Err(AppError::Validation(msg)) if msg.contains("price")
        ));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut req = request();
        req.items[0].quantity = 0;
        assert!(build_draft(&menu(), &req).is_err());
    }

    #[test]
    fn invalid_email_is_rejected_but_absent_email_is_fine() {
        let mut req = request();
        req.customer_email = Some("not-an-email".to_owned());
        assert!(build_draft(&menu(), &req).is_err());

        req.customer_email = Some(String::new());
        assert!(build_draft(&menu(), &req).is_ok());
    }

    #[test]
    fn stored_items_carry_menu_names_and_prices() {
        let mut req = request();
        req.items[0].name = "Fancy Pad Thai".to_owned();
        let draft = build_draft(&menu(), &req).unwrap();
        assert_eq!(draft.items[0].name, "Pad Thai");
    }

    #[test]
    fn payment_statuses_map_to_order_statuses() {
        assert_eq!(order_status_for(PaymentStatus::Paid), Some(OrderStatus::Paid));
        assert_eq!(
            order_status_for(PaymentStatus::Failed),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(
            order_status_for(PaymentStatus::Expired),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(
            order_status_for(PaymentStatus::Canceled),
            Some(OrderStatus::Cancelled)
        );
        assert_eq!(order_status_for(PaymentStatus::Open), None);
        assert_eq!(order_status_for(PaymentStatus::Pending), None);
        assert_eq!(order_status_for(PaymentStatus::Authorized), None);
    }
}
