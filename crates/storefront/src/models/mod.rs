//! Domain models for the storefront.
//!
//! These are validated domain objects returned by the repositories and
//! serialized straight into API responses. Database row types stay private
//! to the `db` module.

pub mod product;
pub mod session;
pub mod user;

pub use slick_core::{Order, OrderItem, OrderWithItems};
pub use product::{Product, ProductDetail, Variant};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{Profile, User};
