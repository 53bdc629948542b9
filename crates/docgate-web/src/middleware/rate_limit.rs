//! Per-client admission in front of the API routes.
//!
//! Each request is keyed by its client IP and checked against the shared
//! [`AdmissionController`](docgate_core::AdmissionController). Rejected
//! requests never reach the handler and get a `429 Too Many Requests`.

use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Identifier shared by requests whose address cannot be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_identifier(&req, state.config.rate_limit.trust_proxy_headers);

    if state.limiter.check_admission(&client) {
        return next.run(req).await;
    }

    tracing::warn!(
        client = %client,
        event = "rate_limited",
        path = %req.uri().path(),
        "Request rejected by rate limiter"
    );
    AppError::TooManyRequests.into_response()
}

/// Resolves the client key for `req`.
///
/// With `trust_proxy_headers`, the first `X-Forwarded-For` hop and then
/// `X-Real-IP` win over the socket peer address.
pub fn client_identifier<B>(req: &Request<B>, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        let real_ip = req
            .headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = real_ip {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request<()> {
        Request::builder().uri("/").body(()).unwrap()
    }

    fn with_peer(mut req: Request<()>, addr: &str) -> Request<()> {
        req.extensions_mut()
            .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn peer_address_is_used() {
        let req = with_peer(request(), "10.0.0.1:5555");
        assert_eq!(client_identifier(&req, false), "10.0.0.1");
    }

    #[test]
    fn port_is_ignored() {
        let a = with_peer(request(), "10.0.0.1:1");
        let b = with_peer(request(), "10.0.0.1:2");
        assert_eq!(client_identifier(&a, false), client_identifier(&b, false));
    }

    #[test]
    fn missing_peer_maps_to_unknown() {
        assert_eq!(client_identifier(&request(), false), UNKNOWN_CLIENT);
    }

    #[test]
    fn proxy_headers_ignored_unless_trusted() {
        let mut req = with_peer(request(), "10.0.0.1:5555");
        req.headers_mut()
            .insert("x-forwarded-for", "203.0.113.7".parse().unwrap());
        assert_eq!(client_identifier(&req, false), "10.0.0.1");
    }

    #[test]
    fn first_forwarded_hop_wins() {
        let mut req = with_peer(request(), "10.0.0.1:5555");
        req.headers_mut().insert(
            "x-forwarded-for",
            "203.0.113.7, 10.1.1.1".parse().unwrap(),
        );
        req.headers_mut()
            .insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_identifier(&req, true), "203.0.113.7");
    }

    #[test]
    fn real_ip_used_without_forwarded_for() {
        let mut req = with_peer(request(), "10.0.0.1:5555");
        req.headers_mut()
            .insert("x-real-ip", "198.51.100.2".parse().unwrap());
        assert_eq!(client_identifier(&req, true), "198.51.100.2");
    }
}
