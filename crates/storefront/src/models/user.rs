//! Customer account types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use slick_core::{Email, UserId};

/// A customer account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}

/// Display data attached to an account.
///
/// A profile row may be missing for accounts created outside the storefront;
/// [`Profile::fallback`] builds one from the account itself.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    #[must_use]
    pub fn fallback(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            full_name: None,
            avatar_url: None,
            created_at: user.created_at,
            updated_at: user.created_at,
        }
    }
}
