//! Approximate device location from the client's IP address.
//!
//! Browsers report precise positions themselves; these providers are the
//! fallback when the user denies the permission prompt or the browser
//! times out. Each provider is tried in order; when all of them fail the
//! caller asks the user for a manual address instead.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::LookupError;
use crate::utils::geo::Coordinate;

#[async_trait]
pub trait Geolocator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Locate `ip`, or the caller's own address when `None`
    async fn locate(&self, ip: Option<IpAddr>) -> Result<Coordinate, LookupError>;
}

fn to_coordinate(lat: Option<f64>, lon: Option<f64>) -> Result<Coordinate, LookupError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            Coordinate::new(lat, lon).map_err(|e| LookupError::InvalidResponse(e.to_string()))
        }
        _ => Err(LookupError::InvalidResponse("missing coordinates".to_string())),
    }
}

// ============ ip-api.com ============

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

pub struct IpApiLocator {
    http: reqwest::Client,
    base_url: String,
}

impl IpApiLocator {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geolocator for IpApiLocator {
    fn name(&self) -> &'static str {
        "ip-api"
    }

    async fn locate(&self, ip: Option<IpAddr>) -> Result<Coordinate, LookupError> {
        let target = ip.map(|ip| ip.to_string()).unwrap_or_default();
        let body: IpApiResponse = self
            .http
            .get(format!("{}/json/{}", self.base_url, target))
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.status != "success" {
            return Err(match body.message {
                Some(message) => LookupError::Unavailable(message),
                None => LookupError::NotFound,
            });
        }

        to_coordinate(body.lat, body.lon)
    }
}

// ============ ipwho.is ============

#[derive(Debug, Deserialize)]
struct IpWhoIsResponse {
    success: bool,
    message: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

pub struct IpWhoIsLocator {
    http: reqwest::Client,
    base_url: String,
}

impl IpWhoIsLocator {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geolocator for IpWhoIsLocator {
    fn name(&self) -> &'static str {
        "ipwho.is"
    }

    async fn locate(&self, ip: Option<IpAddr>) -> Result<Coordinate, LookupError> {
        let target = ip.map(|ip| ip.to_string()).unwrap_or_default();
        let body: IpWhoIsResponse = self
            .http
            .get(format!("{}/{}", self.base_url, target))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !body.success {
            return Err(match body.message {
                Some(message) => LookupError::Unavailable(message),
                None => LookupError::NotFound,
            });
        }

        to_coordinate(body.latitude, body.longitude)
    }
}

// ============ Fallback chain ============

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub source: &'static str,
    pub location: Coordinate,
}

pub struct FallbackLocator {
    providers: Vec<Arc<dyn Geolocator>>,
    attempt_timeout: Duration,
}

impl FallbackLocator {
    pub fn new(providers: Vec<Arc<dyn Geolocator>>, attempt_timeout: Duration) -> Self {
        Self {
            providers,
            attempt_timeout,
        }
    }

    /// Try each provider in order and return the first location found.
    /// When every provider fails, the last error is returned.
    pub async fn resolve(&self, ip: Option<IpAddr>) -> Result<Located, LookupError> {
        let mut last_error = LookupError::Unavailable("no geolocation providers configured".to_string());

        for provider in &self.providers {
            let outcome = tokio::time::timeout(self.attempt_timeout, provider.locate(ip))
                .await
                .unwrap_or(Err(LookupError::Timeout));

            match outcome {
                Ok(location) => {
                    tracing::info!(
                        provider = provider.name(),
                        %location,
                        "Geolocation resolved"
                    );
                    return Ok(Located {
                        source: provider.name(),
                        location,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Geolocation provider failed; trying next"
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
