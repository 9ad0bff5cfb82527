use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::utils::geo::{Coordinate, DistanceUnit, Geofence, Radius};
use crate::utils::links::DirectionsProvider;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub shop_name: String,
    pub shop_location: Coordinate,
    pub delivery_radius: Radius,
    pub nominatim_url: String,
    pub ip_api_url: String,
    pub ipwhois_url: String,
    pub http_timeout: Duration,
    pub http_user_agent: String,
    pub suggestion_limit: usize,
    pub directions_provider: DirectionsProvider,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let shop_location = Coordinate::new(
            parse(&get("SHOP_LAT", "51.4457991"), "SHOP_LAT")?,
            parse(&get("SHOP_LNG", "-0.165856"), "SHOP_LNG")?,
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        let delivery_radius = Radius::new(
            parse(&get("DELIVERY_RADIUS", "1.60934"), "DELIVERY_RADIUS")?,
            get("DELIVERY_RADIUS_UNIT", "km")
                .parse::<DistanceUnit>()
                .map_err(|e| AppError::Config(e.to_string()))?,
        )
        .map_err(|e| AppError::Config(e.to_string()))?;

        let http_timeout_secs: u64 = parse(&get("HTTP_TIMEOUT_SECS", "5"), "HTTP_TIMEOUT_SECS")?;
        if http_timeout_secs == 0 {
            return Err(AppError::Config("HTTP_TIMEOUT_SECS must be at least 1".to_string()));
        }

        let suggestion_limit: usize = parse(&get("SUGGESTION_LIMIT", "5"), "SUGGESTION_LIMIT")?;
        if suggestion_limit == 0 {
            return Err(AppError::Config("SUGGESTION_LIMIT must be at least 1".to_string()));
        }

        Ok(Self {
            server_host: get("SERVER_HOST", "0.0.0.0"),
            server_port: parse(&get("SERVER_PORT", "3000"), "SERVER_PORT")?,
            shop_name: get("SHOP_NAME", "Shop"),
            shop_location,
            delivery_radius,
            nominatim_url: trim_base(get("NOMINATIM_URL", "https://nominatim.openstreetmap.org")),
            ip_api_url: trim_base(get("IP_API_URL", "http://ip-api.com")),
            ipwhois_url: trim_base(get("IPWHOIS_URL", "https://ipwho.is")),
            http_timeout: Duration::from_secs(http_timeout_secs),
            http_user_agent: get(
                "HTTP_USER_AGENT",
                concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            ),
            suggestion_limit,
            directions_provider: get("DIRECTIONS_PROVIDER", "google")
                .parse()
                .map_err(AppError::Config)?,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn geofence(&self) -> Geofence {
        Geofence::new(self.shop_location, self.delivery_radius)
    }
}

fn parse<T: FromStr>(value: &str, key: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, value)))
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
