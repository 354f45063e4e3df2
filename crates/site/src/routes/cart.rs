//! Cart route handlers.
//!
//! The cart aggregate is stored in the session under a fixed key; every
//! handler loads it, applies one pure operation, saves it back, and
//! returns the refreshed view. Prices are never taken from the client:
//! adding an item resolves its name and price from the menu.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use lemongrass_core::{Cart, LineItem, OrderType, format_eur};

use crate::error::{AppError, Result};
use crate::services::orders::{self, CreateOrderRequest};
use crate::state::AppState;

/// Session key the cart aggregate is stored under.
const CART_KEY: &str = "lemongrass.cart";

/// Cart display data returned by every cart endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub items: Vec<LineItem>,
    pub item_count: u32,
    pub total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let summary = cart.summary();
        Self {
            order_type: cart.order_type(),
            items: cart.items().to_vec(),
            item_count: summary.item_count,
            total: format_eur(summary.total),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, or start an empty one.
async fn load_cart(session: &Session) -> Result<Cart> {
    let cart = session
        .get::<Cart>(CART_KEY)
        .await
        .map_err(|e| AppError::Internal(format!("session load failed: {e}")))?;
    Ok(cart.unwrap_or_default())
}

/// Save the cart back into the session.
async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(CART_KEY, cart)
        .await
        .map_err(|e| AppError::Internal(format!("session save failed: {e}")))
}

/// Request body naming one menu item.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub id: String,
}

/// Request body selecting pickup or delivery.
#[derive(Debug, Deserialize)]
pub struct OrderTypeRequest {
    #[serde(rename = "type")]
    pub order_type: OrderType,
}

/// Customer details posted at checkout; the items come from the session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Current cart contents.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add one unit of a menu item to the cart.
///
/// The item id must exist on the menu; name and price are taken from
/// there, not from the request.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<ItemRequest>,
) -> Result<Json<CartView>> {
    let Some(menu_item) = state.menu().item(&request.id) else {
        return Err(AppError::Validation(format!(
            "Unknown menu item: {}.",
            request.id
        )));
    };

    let mut cart = load_cart(&session).await?;
    cart.add_item(&menu_item.id, &menu_item.name, menu_item.price);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Increase an item's quantity by one.
#[instrument(skip(session))]
pub async fn increment(
    session: Session,
    Json(request): Json<ItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.increment(&request.id);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Decrease an item's quantity by one, removing the line at zero.
#[instrument(skip(session))]
pub async fn decrement(
    session: Session,
    Json(request): Json<ItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.decrement(&request.id);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Remove an item from the cart entirely.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<ItemRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove(&request.id);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Select pickup or delivery.
#[instrument(skip(session))]
pub async fn order_type(
    session: Session,
    Json(request): Json<OrderTypeRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.set_order_type(request.order_type);
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Total number of units in the cart, for the header badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.summary().item_count,
    }))
}

/// Submit the session cart as an order.
///
/// An empty cart is rejected before anything else happens. On success the
/// cart is cleared; on any failure it is left intact so the customer can
/// retry without rebuilding it.
#[instrument(skip(state, session, request))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let mut cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::Validation("Your cart is empty.".to_owned()));
    }

    let order = CreateOrderRequest {
        order_type: cart.order_type(),
        customer_name: request.customer_name,
        customer_phone: request.customer_phone,
        customer_email: request.customer_email,
        customer_address: request.customer_address,
        notes: request.notes,
        items: cart.items().to_vec(),
    };

    let outcome = orders::create_order(&state, order).await?;

    cart.clear();
    save_cart(&session, &cart).await?;

    Ok(Json(outcome))
}
