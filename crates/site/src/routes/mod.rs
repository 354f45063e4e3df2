//! HTTP route handlers for the ordering site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the database)
//!
//! # Menu
//! GET  /api/menu               - Menu dataset
//!
//! # Cart (session-backed)
//! GET  /cart                   - Cart contents
//! POST /cart/add               - Add one unit of a menu item
//! POST /cart/increment         - Increase an item's quantity
//! POST /cart/decrement         - Decrease an item's quantity
//! POST /cart/remove            - Remove an item
//! POST /cart/order-type        - Select pickup or delivery
//! GET  /cart/count             - Cart count badge
//! POST /cart/checkout          - Submit the cart as an order
//!
//! # Orders
//! POST /api/orders             - Create order + payment session
//! POST /api/orders/webhook     - Payment-status notification
//! GET  /api/orders/{id}        - Order record
//! ```

pub mod cart;
pub mod menu;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
        .route("/order-type", post(cart::order_type))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the order API routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/webhook", post(orders::webhook))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/menu", get(menu::show))
        .nest("/api/orders", order_routes())
        .nest("/cart", cart_routes())
}
