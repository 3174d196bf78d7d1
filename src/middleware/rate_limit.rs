use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use quizzler_cache::{Decision, RateLimiter};
use quizzler_core::AppError;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Best-effort client address: the first `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the transport peer, then `"unknown"`.
///
/// The forwarding headers are trusted as sent, so this relies on the reverse
/// proxy overwriting them.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    header_value(X_FORWARDED_FOR)
        .and_then(|forwarded| forwarded.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_value(X_REAL_IP))
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &Decision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    if let Some(retry_after) = decision.retry_after_secs {
        headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    }
}

/// Fixed-window admission for the routes it is layered on.
///
/// Counters are keyed by the full request path, so the same limiter layered on
/// several routes gives each route its own budget.
pub async fn rate_limit(
    State(limiter): State<RateLimiter>,
    OriginalUri(uri): OriginalUri,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_identity(request.headers(), peer);

    let decision = limiter.admit(uri.path(), &client).await;

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        AppError::too_many_requests("Too many requests. Please try again later.").into_response()
    };

    apply_headers(response.headers_mut(), &decision);
    response
}
