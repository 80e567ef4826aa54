//! JSON API for the storefront.
//!
//! ```text
//! GET    /api/products?search=       - Active products, newest first
//! GET    /api/products/{slug}        - Product with sizes
//!
//! GET    /api/cart                   - Session cart with totals
//! POST   /api/cart/items             - Add one unit of a product size
//! PATCH  /api/cart/items/{key}       - Set quantity (<= 0 removes)
//! DELETE /api/cart/items/{key}       - Remove a line
//! DELETE /api/cart                   - Empty the cart
//!
//! POST   /api/auth/register          - Create account and log in
//! POST   /api/auth/login             - Log in
//! POST   /api/auth/logout            - Log out (cart is kept)
//! GET    /api/auth/me                - Current account
//! POST   /api/auth/password          - Change password
//!
//! POST   /api/checkout               - Place a cash-on-delivery order
//! GET    /api/orders?status=         - Order history
//! GET    /api/orders/{id}            - One order
//! GET    /api/profile                - Profile
//! PUT    /api/profile                - Update profile
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod profile;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/password", post(auth::change_password))
        .layer(auth_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{slug}", get(products::show))
        .route("/cart", get(cart::show).delete(cart::clear))
        .route("/cart/items", post(cart::add))
        .route(
            "/cart/items/{key}",
            patch(cart::update).delete(cart::remove),
        )
        .route("/checkout", post(checkout::place_order))
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/profile", get(profile::show).put(profile::update))
        .nest("/auth", auth_routes())
        .layer(api_rate_limiter())
}

/// All storefront API routes, mounted under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

