use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::api::ApiError;
use crate::rate_limit::KeyedRateLimiter;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// An incoming `x-request-id` header is reused; otherwise a new `UUIDv4` is
/// generated. The ID is stored as a [`RequestId`] extension and echoed on the
/// response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Refuses requests from a client whose bucket is empty.
pub async fn enforce_rate_limit(
    State(limiter): State<Arc<KeyedRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if limiter.allow(&key) {
        return next.run(req).await;
    }

    tracing::debug!(client = %key, "rate limit exceeded");
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    ApiError::new(request_id, "rate_limited", "rate limit exceeded").into_response()
}

/// Client IP from the connection, or a shared fallback key when the server
/// was not started with connect info.
fn client_key(req: &Request) -> String {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn client_key_uses_peer_ip_without_port() {
        let mut req = Request::new(Body::empty());
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([203, 0, 113, 7], 51_234))));
        assert_eq!(client_key(&req), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_without_connect_info() {
        let req = Request::new(Body::empty());
        assert_eq!(client_key(&req), "unknown");
    }
}
