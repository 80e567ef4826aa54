//! Domain types shared by the storefront, the admin and the CLI.

pub mod address;
pub mod email;
pub mod id;
pub mod money;
pub mod order_number;
pub mod permissions;
pub mod status;

pub use address::{CheckoutForm, CheckoutFormError, DEFAULT_COUNTRY, ShippingAddress};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError};
pub use order_number::OrderNumber;
pub use permissions::{AdminGrant, AdminPermissions, Permission, has_permission};
pub use status::*;
