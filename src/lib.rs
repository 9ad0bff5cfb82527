pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use services::{AddressLookup, FallbackLocator, Geolocator, IpApiLocator, IpWhoIsLocator, NominatimClient};
use utils::geo::Geofence;

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub geofence: Geofence,
    pub addresses: Arc<dyn AddressLookup>,
    pub locator: Arc<FallbackLocator>,
}

impl AppState {
    /// Wire the geofence and the outbound providers described by `config`
    pub fn from_config(config: Config) -> AppResult<Self> {
        let http = services::http_client(&config)?;

        let addresses = Arc::new(NominatimClient::new(http.clone(), config.nominatim_url.clone()));
        let providers: Vec<Arc<dyn Geolocator>> = vec![
            Arc::new(IpApiLocator::new(http.clone(), config.ip_api_url.clone())),
            Arc::new(IpWhoIsLocator::new(http, config.ipwhois_url.clone())),
        ];
        let locator = Arc::new(FallbackLocator::new(providers, config.http_timeout));

        Ok(Self {
            geofence: config.geofence(),
            config,
            addresses,
            locator,
        })
    }
}
