//! `Json` and `Path` extractors whose rejections are [`AppError`]s, so a
//! malformed body or path still answers `{"error": ...}`.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::Multipart;
    use axum::http::{self, StatusCode, header};
    use axum::response::IntoResponse;
    use slick_core::OrderStatus;

    #[derive(Debug, serde::Deserialize)]
    struct StatusChange {
        status: OrderStatus,
    }

    fn request(content_type: &str, body: &'static str) -> Request {
        http::Request::builder()
            .method("PATCH")
            .uri("/api/orders/7/status")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_error(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_valid_body() {
        let ApiJson(change) = ApiJson::<StatusChange>::from_request(
            request("application/json", r#"{"status":"shipped"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(change.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn test_unknown_status_answers_json() {
        let err = ApiJson::<StatusChange>::from_request(
            request("application/json", r#"{"status":"teleported"}"#),
            &(),
        )
        .await
        .unwrap_err();

        let (status, body) = json_error(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("status"));
    }

    #[tokio::test]
    async fn test_wrong_content_type_answers_json() {
        let err = ApiJson::<StatusChange>::from_request(
            request("text/plain", r#"{"status":"shipped"}"#),
            &(),
        )
        .await
        .unwrap_err();

        let (status, body) = json_error(err).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_non_multipart_upload_answers_json() {
        let rejection = Multipart::from_request(request("application/json", "{}"), &())
            .await
            .err()
            .unwrap();

        let (status, body) = json_error(AppError::from(rejection)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}
