//! HTTP middleware for the storefront API.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry (hub per request, transaction per route)
//! 2. `TraceLayer` (one span per request)
//! 3. Request ID (recorded on that span)
//! 4. Security headers
//! 5. Session (`PostgreSQL` store)
//!
//! Rate limiters are attached per route group in [`crate::routes`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
