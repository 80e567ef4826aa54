//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Staff login over customer credentials (argon2)
//! - `admin_users` - Granting back-office access
//! - `uploads` - Product image validation and storage

pub mod admin_users;
pub mod auth;
pub mod uploads;

pub use admin_users::{AdminUserService, GrantError};
pub use auth::{AdminAuthError, AdminAuthService};
pub use uploads::{ImageStore, StoredImage, UploadError};
