//! Slick Core - Shared domain types.
//!
//! This crate provides the types used by every Slick component:
//! - `storefront` - Public catalog, cart, checkout and order history API
//! - `admin` - Back-office API for products, orders and admin users
//! - `cli` - Command-line tools for migrations, admin bootstrap and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. The cart and the permission checks live here so both
//! servers and the tests share a single implementation.
//!
//! # Modules
//!
//! - [`types`] - IDs, emails, money, statuses, permissions, addresses
//! - [`cart`] - The shopping cart held in a visitor's session
//! - [`order`] - Placed orders and, with `postgres`, their row mapping

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod order;
pub mod types;

pub use cart::{Cart, CartLine, CartLineKey, CartLineKeyError, MAX_LINE_QUANTITY, NewCartLine};
pub use order::{Order, OrderItem, OrderWithItems, group_items};
pub use types::*;
