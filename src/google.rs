//! Google Maps Platform HTTP adapters.
//!
//! Geocoding uses Places API (New) `places:searchText`, routing uses Routes
//! API `directions/v2:computeRoutes`, and restaurant lookup uses Places API
//! (New) `places:searchNearby`. Field masks request only what the pipeline
//! reads.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GoogleMapsConfig;
use crate::coordinate::{Coordinate, PartialCoordinate, RestaurantCandidate};
use crate::error::{ConfigIssue, EnrichError, Service};
use crate::traits::{Geocoder, NearbyPlaceProvider, RouteProvider};

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

const TEXT_SEARCH_FIELDS: &str = "places.location";
const ROUTE_FIELDS: &str = "routes.polyline.encodedPolyline";
const NEARBY_FIELDS: &str = "places.id,places.displayName,places.rating,places.userRatingCount,places.location,places.formattedAddress";

const RESTAURANT_TYPE: &str = "restaurant";
const TRAVEL_MODE: &str = "DRIVE";

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GoogleMapsConfig {
        &self.config
    }

    fn api_key(&self) -> Result<&str, EnrichError> {
        if self.config.has_api_key() {
            Ok(&self.config.api_key)
        } else {
            Err(EnrichError::Config(ConfigIssue::MissingApiKey))
        }
    }

    fn post<B, R>(
        &self,
        service: Service,
        url: String,
        field_mask: &str,
        body: &B,
    ) -> Result<R, EnrichError>
    where
        B: Serialize,
        R: for<'de> Deserialize<'de>,
    {
        let api_key = self.api_key()?;
        debug!(%service, %url, "calling google maps");

        self.client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .header(FIELD_MASK_HEADER, field_mask)
            .json(body)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<R>())
            .map_err(|err| EnrichError::upstream(service, err))
    }

    fn places_url(&self, method: &str) -> String {
        format!(
            "{}/v1/places:{}",
            self.config.places_base_url.trim_end_matches('/'),
            method
        )
    }

    fn routes_url(&self) -> String {
        format!(
            "{}/directions/v2:computeRoutes",
            self.config.routes_base_url.trim_end_matches('/')
        )
    }
}

impl Geocoder for GoogleMapsClient {
    fn geocode(&self, place_name: &str) -> Result<Coordinate, EnrichError> {
        let body = TextSearchRequest {
            text_query: place_name,
            language_code: &self.config.language_code,
        };
        let response: PlacesResponse = self.post(
            Service::Geocoding,
            self.places_url("searchText"),
            TEXT_SEARCH_FIELDS,
            &body,
        )?;

        first_place_location(response, place_name)
    }
}

impl RouteProvider for GoogleMapsClient {
    fn compute_route_polyline(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, EnrichError> {
        let body = ComputeRoutesRequest {
            origin: Waypoint::at(origin),
            destination: Waypoint::at(destination),
            travel_mode: TRAVEL_MODE,
        };
        let response: ComputeRoutesResponse =
            self.post(Service::Routes, self.routes_url(), ROUTE_FIELDS, &body)?;

        first_route_polyline(response)
    }
}

impl NearbyPlaceProvider for GoogleMapsClient {
    fn find_nearby_restaurants(
        &self,
        point: Coordinate,
        _caller_id: Option<&str>,
    ) -> Result<Vec<RestaurantCandidate>, EnrichError> {
        let body = NearbySearchRequest {
            included_types: [RESTAURANT_TYPE],
            language_code: &self.config.language_code,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: point,
                    radius: self.config.nearby_radius_meters,
                },
            },
        };
        let response: PlacesResponse = self.post(
            Service::NearbySearch,
            self.places_url("searchNearby"),
            NEARBY_FIELDS,
            &body,
        )?;

        Ok(collect_restaurants(response))
    }
}

fn first_place_location(response: PlacesResponse, place_name: &str) -> Result<Coordinate, EnrichError> {
    let first = response
        .places
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| EnrichError::NoResults {
            place: place_name.to_string(),
        })?;

    first
        .location
        .and_then(|location| location.complete())
        .ok_or_else(|| EnrichError::MissingCoordinates {
            place: place_name.to_string(),
        })
}

fn first_route_polyline(response: ComputeRoutesResponse) -> Result<String, EnrichError> {
    response
        .routes
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|route| route.polyline)
        .and_then(|polyline| polyline.encoded_polyline)
        .filter(|encoded| !encoded.is_empty())
        .ok_or(EnrichError::MissingPolyline)
}

/// Converts places to candidates, skipping entries without an id and
/// keeping the first entry for each id. An absent `places` array is the
/// provider's zero-results answer.
fn collect_restaurants(response: PlacesResponse) -> Vec<RestaurantCandidate> {
    let mut seen = HashSet::new();
    response
        .places
        .unwrap_or_default()
        .into_iter()
        .filter_map(|place| {
            let place_id = place.id.filter(|id| !id.is_empty())?;
            if !seen.insert(place_id.clone()) {
                return None;
            }
            Some(RestaurantCandidate {
                place_id,
                name: place.display_name.and_then(|name| name.text),
                rating: place.rating,
                rating_count: place.user_rating_count,
                location: place.location.unwrap_or_default(),
                address: place.formatted_address,
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextSearchRequest<'a> {
    text_query: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ComputeRoutesRequest {
    origin: Waypoint,
    destination: Waypoint,
    travel_mode: &'static str,
}

#[derive(Debug, Serialize)]
struct Waypoint {
    location: WaypointLocation,
}

impl Waypoint {
    fn at(coordinate: Coordinate) -> Self {
        Self {
            location: WaypointLocation {
                lat_lng: coordinate,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaypointLocation {
    lat_lng: Coordinate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NearbySearchRequest<'a> {
    included_types: [&'static str; 1],
    language_code: &'a str,
    location_restriction: LocationRestriction,
}

#[derive(Debug, Serialize)]
struct LocationRestriction {
    circle: Circle,
}

#[derive(Debug, Serialize)]
struct Circle {
    center: Coordinate,
    radius: f64,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    places: Option<Vec<Place>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Place {
    id: Option<String>,
    display_name: Option<LocalizedText>,
    rating: Option<f64>,
    user_rating_count: Option<u32>,
    location: Option<PartialCoordinate>,
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ComputeRoutesResponse {
    routes: Option<Vec<Route>>,
}

#[derive(Debug, Deserialize)]
struct Route {
    polyline: Option<RoutePolyline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoutePolyline {
    encoded_polyline: Option<String>,
}
