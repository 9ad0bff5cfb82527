use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::extract::ApiJson;
use crate::utils::geo::{Coordinate, Radius};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ShopResponse {
    pub name: String,
    pub origin: Coordinate,
    pub radius: Radius,
    pub radius_km: f64,
}

/// Shop location and delivery radius, used to draw the delivery circle
pub async fn shop_info(State(state): State<AppState>) -> Json<ShopResponse> {
    Json(ShopResponse {
        name: state.config.shop_name.clone(),
        origin: state.geofence.origin,
        radius: state.geofence.radius,
        radius_km: state.geofence.radius.as_kilometers(),
    })
}

#[derive(Debug, Deserialize)]
pub struct DeliveryCheckRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct DeliveryCheckResponse {
    pub location: Coordinate,
    pub distance_km: f64,
    pub radius_km: f64,
    pub within_radius: bool,
    pub message: String,
    pub directions_url: String,
    pub checked_at: DateTime<Utc>,
}

/// Check a location picked on the map (click, drag or device position)
pub async fn check_delivery(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DeliveryCheckRequest>,
) -> AppResult<Json<DeliveryCheckResponse>> {
    let location = Coordinate::new(payload.latitude, payload.longitude)?;

    Ok(Json(evaluate(&state, location)))
}

/// Run the geofence for `location` and describe the outcome
pub fn evaluate(state: &AppState, location: Coordinate) -> DeliveryCheckResponse {
    let geofence = &state.geofence;
    let result = geofence.evaluate(&location);

    let message = if result.within_radius {
        "Delivery address is within the delivery area.".to_string()
    } else {
        format!(
            "Delivery address is outside the {} delivery radius ({:.2} km away).",
            geofence.radius, result.distance_km
        )
    };

    tracing::info!(
        %location,
        distance_km = result.distance_km,
        within_radius = result.within_radius,
        "Delivery check"
    );

    DeliveryCheckResponse {
        location,
        distance_km: result.distance_km,
        radius_km: geofence.radius.as_kilometers(),
        within_radius: result.within_radius,
        message,
        directions_url: state
            .config
            .directions_provider
            .directions_url(&geofence.origin, &location),
        checked_at: Utc::now(),
    }
}
