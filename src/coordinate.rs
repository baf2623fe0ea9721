//! Value types shared by the codec, the resampler and the provider adapters.

use serde::{Deserialize, Serialize};

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate only if both values are finite and in range.
    pub fn try_new(latitude: f64, longitude: f64) -> Option<Self> {
        let coordinate = Self::new(latitude, longitude);
        coordinate.is_valid().then_some(coordinate)
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// A location where the provider may have omitted either component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialCoordinate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PartialCoordinate {
    /// Returns the full coordinate when both components are present and valid.
    pub fn complete(&self) -> Option<Coordinate> {
        Coordinate::try_new(self.latitude?, self.longitude?)
    }
}

/// A restaurant returned by a nearby-place search.
///
/// `place_id` is the provider's identifier and is unique within one search
/// response. The serialized field names follow the JSON payload that
/// consumers of the route endpoint already rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantCandidate {
    pub place_id: String,
    pub name: Option<String>,
    pub rating: Option<f64>,
    #[serde(rename = "user_ratings_total")]
    pub rating_count: Option<u32>,
    pub location: PartialCoordinate,
    #[serde(rename = "vicinity")]
    pub address: Option<String>,
}

impl RestaurantCandidate {
    /// A candidate with only an id and a display name.
    pub fn named(place_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            name: Some(name.into()),
            rating: None,
            rating_count: None,
            location: PartialCoordinate::default(),
            address: None,
        }
    }
}

/// One resampled route position and the restaurants found around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSample {
    pub coordinate: Coordinate,
    pub restaurants: Vec<RestaurantCandidate>,
}

/// Output of [`crate::enrich::RouteEnricher::enrich`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEnrichmentResult {
    /// Encoded polyline exactly as the route provider returned it.
    pub polyline: String,
    /// Samples in route order, origin first.
    pub samples: Vec<RouteSample>,
    /// Every named restaurant in sample order, duplicates kept.
    #[serde(rename = "restaurants_names")]
    pub restaurant_names: Vec<String>,
}
