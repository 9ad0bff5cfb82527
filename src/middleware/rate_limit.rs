use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::{Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};

use crate::error::{AppError, AppResult};
use crate::handlers::location::client_ip;

/// Type alias for the global governor layer (per client IP, proxy aware)
pub type GlobalGovernorLayer = GovernorLayer<
    SmartIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer for global rate limiting (per client IP)
/// - 600 requests per minute (one token every 100ms)
/// - Autocomplete fires on every keystroke, hence the generous burst
pub fn create_global_governor() -> AppResult<GlobalGovernorLayer> {
    ip_governor(100, 300)
}

/// Clients are keyed on `X-Forwarded-For` / `X-Real-IP` / `Forwarded` first,
/// then the peer address, so customers behind the same proxy get their own bucket
fn ip_governor(per_ms: u64, burst: u32) -> AppResult<GlobalGovernorLayer> {
    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| AppError::Config("Invalid rate limit configuration".to_string()))?,
    );

    Ok(GovernorLayer::new(config).error_handler(rate_limit_error_handler))
}

/// Render governor rejections in the same JSON shape as other API errors
pub fn rate_limit_error_handler(error: GovernorError) -> Response<Body> {
    match error {
        GovernorError::TooManyRequests { wait_time, .. } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": format!("Too many requests, retry in {} seconds", wait_time)
            })),
        )
            .into_response(),
        GovernorError::UnableToExtractKey => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Unable to identify client" })),
        )
            .into_response(),
        GovernorError::Other { code, msg, .. } => (
            code,
            Json(json!({ "error": msg.unwrap_or_else(|| "Request rejected".to_string()) })),
        )
            .into_response(),
    }
}

/// Log each API call with the customer address seen through the proxy,
/// the peer that delivered it and how long the check took
pub async fn log_request(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> axum::response::Response {
    let customer = client_ip(request.headers()).unwrap_or_else(|| peer.ip());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match status {
        StatusCode::TOO_MANY_REQUESTS => tracing::warn!(
            client_ip = %customer,
            peer = %peer.ip(),
            %method,
            %path,
            %status,
            "Client exceeded the request budget"
        ),
        s if s.is_client_error() || s.is_server_error() => tracing::warn!(
            client_ip = %customer,
            peer = %peer.ip(),
            %method,
            %path,
            %status,
            elapsed_ms,
            "API call failed"
        ),
        _ => tracing::debug!(
            client_ip = %customer,
            %method,
            %path,
            %status,
            elapsed_ms,
            "API call served"
        ),
    }

    response
}
