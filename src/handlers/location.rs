use std::net::IpAddr;

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::handlers::delivery::{evaluate, DeliveryCheckResponse};
use crate::handlers::extract::ApiQuery;
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LocateQuery {
    pub ip: Option<IpAddr>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub manual_entry_required: bool,
    pub source: Option<&'static str>,
    pub location: Option<Coordinate>,
    pub check: Option<DeliveryCheckResponse>,
}

/// Approximate the customer's position from their IP address when the
/// browser cannot provide one. Never fails: when no provider answers the
/// client is told to ask for a manual address.
pub async fn locate_by_ip(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiQuery(params): ApiQuery<LocateQuery>,
) -> Json<LocationResponse> {
    let ip = params.ip.or_else(|| client_ip(&headers));

    match state.locator.resolve(ip).await {
        Ok(located) => Json(LocationResponse {
            manual_entry_required: false,
            source: Some(located.source),
            location: Some(located.location),
            check: Some(evaluate(&state, located.location)),
        }),
        Err(e) => {
            tracing::warn!(ip = ?ip, error = %e, "All geolocation providers failed");
            Json(LocationResponse {
                manual_entry_required: true,
                source: None,
                location: None,
                check: None,
            })
        }
    }
}

/// Client address as reported by a reverse proxy. Loopback addresses are
/// dropped so providers fall back to the server's own public address.
pub(crate) fn client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    forwarded.or_else(real_ip).filter(|ip| !ip.is_loopback())
}
