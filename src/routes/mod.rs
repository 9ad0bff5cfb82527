use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{address, delivery, location};
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Map widget: shop circle and click/drag checks
    let delivery_routes = Router::new()
        .route("/shop", get(delivery::shop_info))
        .route("/delivery", post(delivery::check_delivery));

    // Typed-address autocomplete and lookup
    let address_routes = Router::new()
        .route("/suggest", get(address::suggest))
        .route("/check", post(address::check_address))
        .route("/reverse", get(address::reverse));

    // Fallback when browser geolocation is unavailable
    let location_routes = Router::new().route("/ip", get(location::locate_by_ip));

    Router::new()
        .nest("/api", delivery_routes)
        .nest("/api/address", address_routes)
        .nest("/api/location", location_routes)
        .with_state(state)
}
