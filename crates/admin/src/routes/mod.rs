//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! POST   /api/auth/login                               - Sign in (rate limited)
//! POST   /api/auth/logout                              - Sign out
//! GET    /api/auth/me                                  - Current admin
//!
//! GET    /api/dashboard                                - Stats (cached 60s per admin)
//!
//! GET    /api/products                                 - All products (products, cached 30s)
//! POST   /api/products                                 - Create (products)
//! GET    /api/products/{id}                            - Detail (products)
//! PUT    /api/products/{id}                            - Update + variant upsert (products)
//! DELETE /api/products/{id}                            - Delete (products)
//! DELETE /api/products/{id}/variants/{variant_id}      - Delete variant (products)
//!
//! GET    /api/orders                                   - All orders (orders, cached 30s)
//! PATCH  /api/orders/{id}/status                       - Set status (orders)
//! DELETE /api/orders/{id}                              - Delete (orders)
//!
//! GET    /api/admin-users                              - List (users)
//! POST   /api/admin-users                              - Grant access (super admin)
//! POST   /api/admin-users/{id}/toggle                  - Activate/deactivate (super admin)
//!
//! POST   /api/uploads/images                           - Product image upload (products)
//! ```

mod admin_users;
mod auth;
mod dashboard;
mod orders;
mod products;
mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

use crate::middleware::{api_rate_limiter, login_rate_limiter};
use crate::services::uploads::MAX_IMAGE_BYTES;
use crate::state::AppState;

/// Room for multipart framing on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .layer(login_rate_limiter())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::show))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/products/{id}/variants/{variant_id}",
            delete(products::destroy_variant),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}/status", patch(orders::update_status))
        .route("/orders/{id}", delete(orders::destroy))
        .route(
            "/admin-users",
            get(admin_users::index).post(admin_users::create),
        )
        .route("/admin-users/{id}/toggle", post(admin_users::toggle))
        .route(
            "/uploads/images",
            post(uploads::image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .nest("/auth", auth_routes())
        .layer(api_rate_limiter())
}

/// All API routes, nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}
