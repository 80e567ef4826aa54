//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (correlation ID on the span, Sentry and the response)
//! 4. Security headers (strict policy, HSTS over HTTPS)
//! 5. Session layer (tower-sessions, `admin.session` table)
//! 6. Rate limiting (per route group)
//! 7. Auth extractors (`RequireAdminAuth`, `RequireSuperAdmin`) in handlers

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdminAuth, RequireSuperAdmin, clear_current_admin, set_current_admin};
pub use rate_limit::{api_rate_limiter, login_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, create_session_store};
