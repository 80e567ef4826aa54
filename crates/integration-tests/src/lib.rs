//! Integration tests for Slick.
//!
//! # Running Tests
//!
//! ```bash
//! # Pure cross-crate tests need nothing running
//! cargo test -p slick-integration-tests
//!
//! # HTTP flows need both servers, a migrated database and a seeded catalog
//! slick-cli migrate && slick-cli seed
//! slick-cli admin create --email admin@example.com --password 'long enough'
//! ADMIN_TEST_EMAIL=admin@example.com ADMIN_TEST_PASSWORD='long enough' \
//!     cargo test -p slick-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart and checkout-form behavior shared by both servers
//! - `admin_access` - Permissions, grants and the admin cache
//! - `storefront_api` - Storefront HTTP flows (ignored by default)
//! - `admin_api` - Admin HTTP flows (ignored by default)

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;

/// Base URL of a running storefront, `STOREFRONT_BASE_URL` or the local default.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Base URL of a running admin server, `ADMIN_BASE_URL` or the local default.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_owned())
}

/// Credentials of an existing admin account for the admin flows.
///
/// `None` when `ADMIN_TEST_EMAIL` or `ADMIN_TEST_PASSWORD` is unset.
#[must_use]
pub fn admin_credentials() -> Option<(String, String)> {
    let email = std::env::var("ADMIN_TEST_EMAIL").ok()?;
    let password = std::env::var("ADMIN_TEST_PASSWORD").ok()?;
    Some((email, password))
}

/// HTTP client that keeps session cookies between requests.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn session_client() -> reqwest::Result<Client> {
    Client::builder().cookie_store(true).build()
}

/// A throwaway address that will not collide with earlier runs.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_email_is_unique() {
        let a = unique_email("it");
        let b = unique_email("it");
        assert_ne!(a, b);
        assert!(a.starts_with("it-"));
        assert!(a.ends_with("@example.com"));
    }
}
