//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Customer registration, login and password changes (argon2)
//! - `cart` - Loading and saving the session cart
//! - `checkout` - Turning a cart into an order

pub mod auth;
pub mod cart;
pub mod checkout;

pub use auth::{AuthError, AuthService};
pub use checkout::{CheckoutError, CheckoutService};
