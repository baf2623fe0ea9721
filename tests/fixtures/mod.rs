//! Test fixtures for route-restaurants.
//!
//! Provides:
//! - Station coordinates and the reference route polyline
//! - In-memory fakes for the geocoding, route and nearby-search providers

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use route_restaurants::error::{EnrichError, Service};
use route_restaurants::traits::{Geocoder, NearbyPlaceProvider, RouteProvider};
use route_restaurants::{Coordinate, RestaurantCandidate};

pub const TOKYO_STATION: (&str, Coordinate) = ("Tokyo Station", Coordinate::new(35.681236, 139.767125));
pub const KYOTO_STATION: (&str, Coordinate) = ("Kyoto Station", Coordinate::new(34.985849, 135.758766));

/// Three points, ~143 m long in total.
pub const STATION_POLYLINE: &str = "w~wxEqgatYcBcBcBcB";

pub const RESTAURANT_NAMES: [&str; 4] = [
    "Restaurant Alpha",
    "Restaurant Beta",
    "Restaurant Gamma",
    "Restaurant Delta",
];

// ============================================================================
// Geocoding
// ============================================================================

/// Resolves names from a fixed table; unknown names yield `NoResults`.
#[derive(Debug, Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Coordinate>,
    calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with(places: &[(&str, Coordinate)]) -> Self {
        Self {
            places: places
                .iter()
                .map(|(name, coordinate)| (name.to_string(), *coordinate))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn stations() -> Self {
        Self::with(&[TOKYO_STATION, KYOTO_STATION])
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, place_name: &str) -> Result<Coordinate, EnrichError> {
        self.calls.lock().unwrap().push(place_name.to_string());
        self.places
            .get(place_name)
            .copied()
            .ok_or_else(|| EnrichError::NoResults {
                place: place_name.to_string(),
            })
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Returns the same encoded polyline for every request.
#[derive(Debug)]
pub struct FakeRoutes {
    polyline: String,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl FakeRoutes {
    pub fn returning(polyline: impl Into<String>) -> Self {
        Self {
            polyline: polyline.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().unwrap().clone()
    }
}

impl RouteProvider for FakeRoutes {
    fn compute_route_polyline(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, EnrichError> {
        self.calls.lock().unwrap().push((origin, destination));
        Ok(self.polyline.clone())
    }
}

// ============================================================================
// Nearby search
// ============================================================================

type Responder = Box<dyn Fn(usize, Coordinate) -> Result<Vec<RestaurantCandidate>, EnrichError> + Send + Sync>;

/// Answers each lookup through a closure given the call index and point.
pub struct FakeNearby {
    responder: Responder,
    calls: Mutex<Vec<(Coordinate, Option<String>)>>,
}

impl FakeNearby {
    pub fn new(
        responder: impl Fn(usize, Coordinate) -> Result<Vec<RestaurantCandidate>, EnrichError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The n-th call returns one restaurant named `names[n]`; later calls
    /// return nothing.
    pub fn sequence(names: &[&str]) -> Self {
        let names: Vec<String> = names.iter().map(|name| name.to_string()).collect();
        Self::new(move |index, _| {
            Ok(names
                .get(index)
                .map(|name| vec![restaurant(&format!("place-{index}"), name)])
                .unwrap_or_default())
        })
    }

    /// Every call returns the same restaurants.
    pub fn always(restaurants: Vec<RestaurantCandidate>) -> Self {
        Self::new(move |_, _| Ok(restaurants.clone()))
    }

    /// Calls before `index` return nothing; that call fails upstream.
    pub fn failing_at(index: usize) -> Self {
        Self::new(move |call, _| {
            if call == index {
                Err(EnrichError::upstream(Service::NearbySearch, "HTTP 500"))
            } else {
                Ok(Vec::new())
            }
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(Coordinate, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl NearbyPlaceProvider for FakeNearby {
    fn find_nearby_restaurants(
        &self,
        point: Coordinate,
        caller_id: Option<&str>,
    ) -> Result<Vec<RestaurantCandidate>, EnrichError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((point, caller_id.map(str::to_string)));
            calls.len() - 1
        };
        (self.responder)(index, point)
    }
}

pub fn restaurant(place_id: &str, name: &str) -> RestaurantCandidate {
    RestaurantCandidate::named(place_id, name)
}
