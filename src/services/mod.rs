pub mod geocoding;
pub mod geolocation;

use thiserror::Error;

use crate::config::Config;
use crate::error::{AppError, AppResult};

pub use geocoding::{AddressLookup, AddressSuggestion, NominatimClient};
pub use geolocation::{FallbackLocator, Geolocator, IpApiLocator, IpWhoIsLocator};

/// Failure of an outbound address or location lookup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("request timed out")]
    Timeout,

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("no result found")]
    NotFound,

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout
        } else if e.is_decode() {
            LookupError::InvalidResponse(e.to_string())
        } else {
            LookupError::Unavailable(e.to_string())
        }
    }
}

/// Shared HTTP client for all outbound lookups
pub fn http_client(config: &Config) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.http_timeout)
        .user_agent(config.http_user_agent.clone())
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}
