use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const METERS_PER_KM: f64 = 1000.0;
const KM_PER_MILE: f64 = 1.609344;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("Invalid coordinate ({latitude}, {longitude}): latitude must be in [-90, 90] and longitude in [-180, 180]")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Invalid radius {0}: must be a positive, finite number")]
    InvalidRadius(f64),

    #[error("Unknown distance unit '{0}' (expected km, m or mi)")]
    UnknownUnit(String),
}

/// A validated latitude/longitude pair in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = GeoError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(GeoError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.7},{:.7}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "mi")]
    Miles,
}

impl DistanceUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Meters => "m",
            DistanceUnit::Miles => "mi",
        }
    }

    fn to_kilometers(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => value,
            DistanceUnit::Meters => value / METERS_PER_KM,
            DistanceUnit::Miles => value * KM_PER_MILE,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometers" | "kilometres" => Ok(DistanceUnit::Kilometers),
            "m" | "meters" | "metres" => Ok(DistanceUnit::Meters),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            other => Err(GeoError::UnknownUnit(other.to_string())),
        }
    }
}

/// Delivery radius with an explicit unit.
///
/// Distances are always computed in kilometers, so comparisons go through
/// [`Radius::as_kilometers`] and a meters radius can never be compared
/// against a kilometer distance by accident.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Radius {
    value: f64,
    unit: DistanceUnit,
}

impl Radius {
    pub fn new(value: f64, unit: DistanceUnit) -> Result<Self, GeoError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(GeoError::InvalidRadius(value));
        }
        Ok(Self { value, unit })
    }

    pub fn kilometers(value: f64) -> Result<Self, GeoError> {
        Self::new(value, DistanceUnit::Kilometers)
    }

    pub fn meters(value: f64) -> Result<Self, GeoError> {
        Self::new(value, DistanceUnit::Meters)
    }

    pub fn miles(value: f64) -> Result<Self, GeoError> {
        Self::new(value, DistanceUnit::Miles)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn as_kilometers(&self) -> f64 {
        self.unit.to_kilometers(self.value)
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeofenceResult {
    pub distance_km: f64,
    pub within_radius: bool,
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn distance_between(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Check if a point is within the radius of an origin. The boundary is inclusive.
pub fn is_within_radius(origin: &Coordinate, point: &Coordinate, radius: Radius) -> GeofenceResult {
    let distance_km = distance_between(origin, point);

    GeofenceResult {
        distance_km,
        within_radius: distance_km <= radius.as_kilometers(),
    }
}

/// Circular delivery area around a shop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geofence {
    pub origin: Coordinate,
    pub radius: Radius,
}

impl Geofence {
    pub fn new(origin: Coordinate, radius: Radius) -> Self {
        Self { origin, radius }
    }

    pub fn evaluate(&self, point: &Coordinate) -> GeofenceResult {
        is_within_radius(&self.origin, point, self.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const SHOP: (f64, f64) = (51.4457991, -0.165856);

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    fn random_coords(seed: u64, n: usize) -> Vec<Coordinate> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| coord(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0)))
            .collect()
    }

    /// Point `km` kilometers due east of `origin`, using the local
    /// degree-of-longitude length at the origin's latitude
    fn east_of(origin: &Coordinate, km: f64) -> Coordinate {
        let km_per_degree = EARTH_RADIUS_KM.to_radians() * origin.latitude().to_radians().cos();
        coord(origin.latitude(), origin.longitude() + km / km_per_degree)
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let shop = coord(SHOP.0, SHOP.1);
        assert_eq!(distance_between(&shop, &shop), 0.0);

        for c in random_coords(7, 200) {
            assert_eq!(distance_between(&c, &c), 0.0);
        }
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let distance = distance_between(&coord(0.0, 0.0), &coord(0.0, 1.0));
        assert!((distance - 111.19).abs() < 0.1, "got {distance}");
    }

    #[test]
    fn test_haversine_jakarta_bandung() {
        let jakarta = coord(-6.2088, 106.8456);
        let bandung = coord(-6.9175, 107.6191);

        let distance = distance_between(&jakarta, &bandung);
        // Should be approximately 115-120 km
        assert!(distance > 100.0 && distance < 150.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let coords = random_coords(42, 100);
        for pair in coords.windows(2) {
            let ab = distance_between(&pair[0], &pair[1]);
            let ba = distance_between(&pair[1], &pair[0]);
            assert!((ab - ba).abs() <= 1e-9 * ab.max(1.0), "{ab} != {ba}");
        }
    }

    #[test]
    fn test_triangle_inequality() {
        let coords = random_coords(1234, 150);
        for triple in coords.windows(3) {
            let (a, b, c) = (&triple[0], &triple[1], &triple[2]);
            let direct = distance_between(a, c);
            let via = distance_between(a, b) + distance_between(b, c);
            assert!(direct <= via + 1e-6, "{direct} > {via}");
        }
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let distance = distance_between(&coord(0.0, 0.0), &coord(0.0, 180.0));
        assert!(distance.is_finite());
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let origin = coord(SHOP.0, SHOP.1);
        let point = coord(51.45, -0.15);
        let exact = distance_between(&origin, &point);

        let result = is_within_radius(&origin, &point, Radius::kilometers(exact).unwrap());
        assert_eq!(result.distance_km, exact);
        assert!(result.within_radius);
    }

    #[test]
    fn test_growing_radius_never_excludes() {
        let origin = coord(SHOP.0, SHOP.1);
        for point in random_coords(99, 50) {
            let mut was_within = false;
            for step in 1..=40 {
                let radius = Radius::kilometers(step as f64 * 500.0).unwrap();
                let within = is_within_radius(&origin, &point, radius).within_radius;
                assert!(within || !was_within);
                was_within = within;
            }
        }
    }

    #[test]
    fn test_shop_delivery_scenario() {
        let shop = coord(SHOP.0, SHOP.1);
        let geofence = Geofence::new(shop, Radius::kilometers(1.60934).unwrap());

        let near = geofence.evaluate(&east_of(&shop, 1.0));
        assert!(near.within_radius);
        assert!((near.distance_km - 1.0).abs() < 0.01);

        let far = geofence.evaluate(&east_of(&shop, 5.0));
        assert!(!far.within_radius);
    }

    #[test]
    fn test_within_radius() {
        let center = coord(-6.2088, 106.8456); // Jakarta
        let nearby = coord(-6.21, 106.85);
        let far = coord(-6.9175, 107.6191); // Bandung
        let radius = Radius::kilometers(10.0).unwrap();

        assert!(is_within_radius(&center, &nearby, radius).within_radius);
        assert!(!is_within_radius(&center, &far, radius).within_radius);
    }

    #[test]
    fn test_units_are_converted_before_comparison() {
        let shop = coord(SHOP.0, SHOP.1);
        let point = east_of(&shop, 1.2);

        let in_meters = Radius::meters(1609.34).unwrap();
        let in_miles = Radius::miles(1.0).unwrap();
        let in_km = Radius::kilometers(1.60934).unwrap();

        assert!((in_meters.as_kilometers() - in_km.as_kilometers()).abs() < 1e-9);
        assert!((in_miles.as_kilometers() - 1.609344).abs() < 1e-12);
        for radius in [in_meters, in_miles, in_km] {
            assert!(is_within_radius(&shop, &point, radius).within_radius);
        }

        // 1609 kilometers is not the same as 1609 meters
        let far = east_of(&shop, 5.0);
        assert!(!is_within_radius(&shop, &far, in_meters).within_radius);
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());

        for (lat, lng) in [
            (90.5, 0.0),
            (-91.0, 0.0),
            (0.0, 180.01),
            (0.0, -200.0),
            (f64::NAN, 0.0),
            (0.0, f64::INFINITY),
        ] {
            assert!(matches!(
                Coordinate::new(lat, lng),
                Err(GeoError::InvalidCoordinate { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_radius_rejected() {
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                Radius::kilometers(value),
                Err(GeoError::InvalidRadius(_))
            ));
        }
    }

    #[test]
    fn test_parse_distance_unit() {
        assert_eq!("km".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert_eq!(" Meters ".parse::<DistanceUnit>().unwrap(), DistanceUnit::Meters);
        assert_eq!("MI".parse::<DistanceUnit>().unwrap(), DistanceUnit::Miles);
        assert!(matches!(
            "furlongs".parse::<DistanceUnit>(),
            Err(GeoError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_coordinate_deserialization_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude": 51.5, "longitude": -0.1}"#).unwrap();
        assert_eq!(ok, coord(51.5, -0.1));

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 95.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }
}
