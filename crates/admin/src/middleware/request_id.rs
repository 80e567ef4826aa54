//! Request correlation IDs for admin.

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_LEN: usize = 128;

/// Accept an upstream ID only if it is short and made of safe characters.
fn sanitize(value: &HeaderValue) -> Option<&str> {
    let id = value.to_str().ok()?.trim();
    let ok = (1..=MAX_LEN).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'));
    ok.then_some(id)
}

/// Reuse or mint `x-request-id`, record it on the span and in Sentry, and
/// echo it on the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(sanitize)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        let good = HeaderValue::from_static("req-42_a.b");
        assert_eq!(sanitize(&good), Some("req-42_a.b"));
        assert_eq!(sanitize(&HeaderValue::from_static("   ")), None);
        assert_eq!(sanitize(&HeaderValue::from_static("a/b")), None);
        let long = HeaderValue::from_str(&"a".repeat(MAX_LEN + 1)).unwrap();
        assert_eq!(sanitize(&long), None);
    }
}
