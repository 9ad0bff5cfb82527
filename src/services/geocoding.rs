use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LookupError;
use crate::utils::geo::Coordinate;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressSuggestion {
    pub display_name: String,
    pub location: Coordinate,
}

/// Free-text address search and reverse geocoding
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<AddressSuggestion>, LookupError>;

    async fn reverse(&self, location: Coordinate) -> Result<Option<String>, LookupError>;
}

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct SearchPlace {
    display_name: String,
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct ReversePlace {
    display_name: Option<String>,
    error: Option<String>,
}

pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl SearchPlace {
    fn into_suggestion(self) -> Option<AddressSuggestion> {
        let lat = self.lat.parse().ok()?;
        let lon = self.lon.parse().ok()?;
        let location = Coordinate::new(lat, lon).ok()?;

        Some(AddressSuggestion {
            display_name: self.display_name,
            location,
        })
    }
}

#[async_trait]
impl AddressLookup for NominatimClient {
    async fn suggest(&self, query: &str, limit: usize) -> Result<Vec<AddressSuggestion>, LookupError> {
        let limit = limit.to_string();
        let places: Vec<SearchPlace> = self
            .http
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let total = places.len();
        let suggestions: Vec<AddressSuggestion> = places
            .into_iter()
            .filter_map(SearchPlace::into_suggestion)
            .collect();

        if suggestions.len() < total {
            tracing::debug!(
                skipped = total - suggestions.len(),
                "Dropped address suggestions with unusable coordinates"
            );
        }

        Ok(suggestions)
    }

    async fn reverse(&self, location: Coordinate) -> Result<Option<String>, LookupError> {
        let place: ReversePlace = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", location.latitude().to_string()),
                ("lon", location.longitude().to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = place.error {
            tracing::debug!(%location, error = %error, "Reverse geocoding found no address");
            return Ok(None);
        }

        Ok(place.display_name)
    }
}
