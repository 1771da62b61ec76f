//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /shop
//! GET  /health                 - Health check
//!
//! # Shop
//! GET  /shop                   - Product grid (?category= filters)
//! GET  /api/products           - Catalog JSON
//!
//! # Cart (HTMX fragments, `context` = sidebar | page)
//! GET  /cart                   - Cart page
//! GET  /cart/sidebar           - Sidebar elements (out-of-band swaps)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/add               - Add product object
//! POST /cart/update            - Set quantity (<= 0 removes)
//! POST /cart/increment         - Quantity +1
//! POST /cart/decrement         - Quantity -1 (never removes)
//! POST /cart/remove            - Remove line
//!
//! # Checkout
//! POST /checkout               - Start checkout (HX-Redirect)
//! GET  /api/checkout           - Payment hand-off (?items=)
//! GET  /checkout/success       - Confirmation, clears cart
//! ```

pub mod cart;
pub mod checkout;
pub mod shop;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/sidebar", get(cart::sidebar))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/increment", post(cart::increment))
        .route("/decrement", post(cart::decrement))
        .route("/remove", post(cart::remove))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::start))
        .route("/success", get(checkout::success))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(shop::products))
        .route("/checkout", get(checkout::handoff))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/shop") }))
        .route("/shop", get(shop::index))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout
        .nest("/checkout", checkout_routes())
        // JSON API
        .nest("/api", api_routes())
}
