use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::delivery::{evaluate, DeliveryCheckResponse};
use crate::handlers::extract::{ApiJson, ApiQuery};
use crate::services::AddressSuggestion;
use crate::utils::geo::Coordinate;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// Address autocomplete. Lookup failures are logged and yield no suggestions.
pub async fn suggest(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SuggestQuery>,
) -> Json<Vec<AddressSuggestion>> {
    let query = params.q.trim();
    if query.is_empty() {
        return Json(Vec::new());
    }

    let max = state.config.suggestion_limit;
    let limit = params.limit.unwrap_or(max).clamp(1, max);

    match state.addresses.suggest(query, limit).await {
        Ok(suggestions) => Json(suggestions),
        Err(e) => {
            tracing::warn!(query = %query, error = %e, "Address suggestion lookup failed");
            Json(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddressCheckRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AddressCheckResponse {
    pub display_name: String,
    #[serde(flatten)]
    pub check: DeliveryCheckResponse,
}

/// Geocode a typed address and check it against the delivery area
pub async fn check_address(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AddressCheckRequest>,
) -> AppResult<Json<AddressCheckResponse>> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("Address must not be empty".to_string()));
    }

    let best = state
        .addresses
        .suggest(query, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::NotFound(format!("No address found for '{}'", query)))?;

    Ok(Json(AddressCheckResponse {
        check: evaluate(&state, best.location),
        display_name: best.display_name,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Serialize)]
pub struct ReverseResponse {
    pub display_name: Option<String>,
}

/// Human-readable address for a map position
pub async fn reverse(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ReverseQuery>,
) -> AppResult<Json<ReverseResponse>> {
    let location = Coordinate::new(params.lat, params.lng)?;

    let display_name = match state.addresses.reverse(location).await {
        Ok(name) => name,
        Err(e) => {
            tracing::warn!(%location, error = %e, "Reverse geocoding failed");
            None
        }
    };

    Ok(Json(ReverseResponse { display_name }))
}
