use std::str::FromStr;

use serde::Serialize;

use crate::utils::geo::Coordinate;

/// External site used to build "get directions" links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionsProvider {
    Google,
    OpenStreetMap,
}

impl DirectionsProvider {
    pub fn directions_url(&self, origin: &Coordinate, destination: &Coordinate) -> String {
        match self {
            DirectionsProvider::Google => format!(
                "https://www.google.com/maps/dir/?api=1&origin={origin}&destination={destination}"
            ),
            // OSM expects "lat,lng;lat,lng" percent-encoded in a single parameter
            DirectionsProvider::OpenStreetMap => format!(
                "https://www.openstreetmap.org/directions?route={}%3B{}",
                origin.to_string().replace(',', "%2C"),
                destination.to_string().replace(',', "%2C"),
            ),
        }
    }
}

impl FromStr for DirectionsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(DirectionsProvider::Google),
            "osm" | "openstreetmap" => Ok(DirectionsProvider::OpenStreetMap),
            other => Err(format!("Unknown directions provider '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shop() -> Coordinate {
        Coordinate::new(51.4457991, -0.165856).unwrap()
    }

    #[test]
    fn test_google_directions_url() {
        let customer = Coordinate::new(51.45, -0.15).unwrap();
        let url = DirectionsProvider::Google.directions_url(&shop(), &customer);

        assert_eq!(
            url,
            "https://www.google.com/maps/dir/?api=1&origin=51.4457991,-0.1658560&destination=51.4500000,-0.1500000"
        );
    }

    #[test]
    fn test_osm_directions_url() {
        let customer = Coordinate::new(51.45, -0.15).unwrap();
        let url = DirectionsProvider::OpenStreetMap.directions_url(&shop(), &customer);

        assert_eq!(
            url,
            "https://www.openstreetmap.org/directions?route=51.4457991%2C-0.1658560%3B51.4500000%2C-0.1500000"
        );
    }

    #[test]
    fn test_parse_provider() {
        assert_eq!("Google".parse::<DirectionsProvider>(), Ok(DirectionsProvider::Google));
        assert_eq!("osm".parse::<DirectionsProvider>(), Ok(DirectionsProvider::OpenStreetMap));
        assert!("bing".parse::<DirectionsProvider>().is_err());
    }
}
