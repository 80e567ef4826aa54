//! Unified error handling for admin.
//!
//! Handlers return [`Result<T>`]; failures become `{"error": "<message>"}`
//! with the mapped status. Server errors are captured to Sentry and their
//! details never reach the client.

use axum::{
    Json,
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AdminAuthError, GrantError, UploadError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    #[error("Grant error: {0}")]
    Grant(#[from] GrantError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A body or path that failed to parse, with the status axum chose.
    #[error("Rejected request: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

macro_rules! from_rejection {
    ($($rejection:ty),+ $(,)?) => {
        $(
            impl From<$rejection> for AppError {
                fn from(rejection: $rejection) -> Self {
                    Self::Rejected {
                        status: rejection.status(),
                        message: rejection.body_text(),
                    }
                }
            }
        )+
    };
}

from_rejection!(JsonRejection, PathRejection, MultipartRejection);

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Auth(err) => match err {
                AdminAuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AdminAuthError::NotAnAdmin | AdminAuthError::Inactive => StatusCode::FORBIDDEN,
                AdminAuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
                AdminAuthError::Repository(_) | AdminAuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Grant(err) => match err {
                GrantError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
                GrantError::UserNotFound => StatusCode::NOT_FOUND,
                GrantError::AlreadyAdmin => StatusCode::CONFLICT,
                GrantError::SuperAdminRequired => StatusCode::FORBIDDEN,
                GrantError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Upload(err) => match err {
                UploadError::NotAnImage | UploadError::MissingFile => StatusCode::BAD_REQUEST,
                UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Rejected { status, .. } => *status,
        }
    }

    fn client_message(&self) -> String {
        if self.status().is_server_error() {
            return "Internal server error".to_owned();
        }
        match self {
            Self::Auth(AdminAuthError::InvalidCredentials) => "Invalid email or password".to_owned(),
            Self::Auth(AdminAuthError::NotAnAdmin | AdminAuthError::Inactive) => {
                "You do not have admin access".to_owned()
            }
            Self::Auth(AdminAuthError::WeakPassword(msg))
            | Self::Database(RepositoryError::Conflict(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg)
            | Self::PayloadTooLarge(msg)
            | Self::Rejected { message: msg, .. } => msg.clone(),
            Self::Grant(err) => err.to_string(),
            Self::Upload(err) => err.to_string(),
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            _ => "Internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status_of(AppError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("x".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Conflict("x".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AppError::PayloadTooLarge("x".into())),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_of(AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_errors_map_to_statuses() {
        assert_eq!(
            status_of(RepositoryError::Conflict("slug".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(RepositoryError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AdminAuthError::NotAnAdmin.into()), StatusCode::FORBIDDEN);
        assert_eq!(status_of(GrantError::UserNotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(GrantError::AlreadyAdmin.into()), StatusCode::CONFLICT);
        assert_eq!(status_of(UploadError::TooLarge.into()), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(status_of(UploadError::NotAnImage.into()), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_facing_messages() {
        assert_eq!(
            body_of(GrantError::UserNotFound.into()).await["error"],
            "User not found with that email address"
        );
        assert_eq!(
            body_of(UploadError::NotAnImage.into()).await["error"],
            "Please select an image file"
        );
        assert_eq!(
            body_of(AdminAuthError::InvalidCredentials.into()).await["error"],
            "Invalid email or password"
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("bad row 7".into()));
        assert_eq!(body_of(err).await["error"], "Internal server error");

        let io = std::io::Error::other("disk full at /var/media");
        assert_eq!(
            body_of(UploadError::Io(io).into()).await["error"],
            "Internal server error"
        );
    }
}
