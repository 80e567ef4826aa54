//! Back-office domain models.
//!
//! Repositories return these and handlers serialize them as-is.

pub mod admin_user;
pub mod dashboard;
pub mod product;
pub mod session;

pub use admin_user::AdminUser;
pub use dashboard::{ActivityEntry, ActivityKind, DashboardStats};
pub use slick_core::{Order, OrderItem, OrderWithItems};
pub use product::{Product, ProductInput, ProductWithVariants, Variant, VariantInput};
pub use session::{CurrentAdmin, keys as session_keys};
