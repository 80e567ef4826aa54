//! Rate limiting for admin endpoints.
//!
//! - [`login_rate_limiter`]: `POST /api/auth/login`, burst 5 then one every 6s
//! - [`api_rate_limiter`]: all other `/api` routes, burst 100 then 2/s

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::key_extractor::KeyExtractor;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Keys requests by `CF-Connecting-IP`, then the first `X-Forwarded-For`
/// hop, then `Fly-Client-IP`, then the peer address.
#[derive(Debug, Clone, Copy)]
pub struct AdminIpKeyExtractor;

fn header_ip<T>(req: &Request<T>, name: &str) -> Option<IpAddr> {
    let value = req.headers().get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

impl KeyExtractor for AdminIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        ["cf-connecting-ip", "x-forwarded-for", "fly-client-ip"]
            .into_iter()
            .find_map(|name| header_ip(req, name))
            .or_else(|| {
                req.extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

pub type RateLimiterLayer =
    GovernorLayer<AdminIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// # Panics
///
/// Does not panic; the period and burst are non-zero constants.
#[must_use]
pub fn login_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(AdminIpKeyExtractor)
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("login limiter quota is non-zero");
    GovernorLayer::new(Arc::new(config))
}

/// # Panics
///
/// Does not panic; the period and burst are non-zero constants.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(AdminIpKeyExtractor)
        .per_millisecond(500)
        .burst_size(100)
        .finish()
        .expect("api limiter quota is non-zero");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_order_then_peer() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "198.51.100.4, 10.0.0.1")
            .header("cf-connecting-ip", "203.0.113.9")
            .body(())
            .unwrap();
        assert_eq!(
            AdminIpKeyExtractor.extract(&req).unwrap(),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );

        req.headers_mut().remove("cf-connecting-ip");
        assert_eq!(
            AdminIpKeyExtractor.extract(&req).unwrap(),
            "198.51.100.4".parse::<IpAddr>().unwrap()
        );

        let mut bare = Request::new(());
        assert!(AdminIpKeyExtractor.extract(&bare).is_err());
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        bare.extensions_mut().insert(ConnectInfo(peer));
        assert_eq!(AdminIpKeyExtractor.extract(&bare).unwrap(), peer.ip());
    }
}
