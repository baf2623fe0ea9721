//! Capabilities the enrichment pipeline depends on.
//!
//! Each upstream API sits behind its own minimal trait so the orchestrator
//! can run against the Google adapters in production and against in-memory
//! fakes in tests.

use std::time::{Duration, Instant};

use crate::coordinate::{Coordinate, RestaurantCandidate};
use crate::error::EnrichError;

/// Resolves free-text place names to coordinates.
pub trait Geocoder {
    /// Returns the coordinate of the provider's first candidate.
    fn geocode(&self, place_name: &str) -> Result<Coordinate, EnrichError>;
}

/// Computes driving routes.
pub trait RouteProvider {
    /// Returns the encoded polyline of the first route candidate.
    fn compute_route_polyline(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, EnrichError>;
}

/// Finds restaurants around a point.
pub trait NearbyPlaceProvider {
    /// Returns restaurants near `point`, unique by place id, in provider order.
    ///
    /// `caller_id` identifies who the lookup is billed to; implementations
    /// that enforce a per-caller budget check it before any upstream call.
    fn find_nearby_restaurants(
        &self,
        point: Coordinate,
        caller_id: Option<&str>,
    ) -> Result<Vec<RestaurantCandidate>, EnrichError>;
}

/// Per-key attempt counter with fixed expiry windows.
///
/// Implementations are shared between concurrent requests and must be safe
/// to call from several threads.
pub trait RateLimiter: Send + Sync {
    /// True when `key` already has `max_attempts` hits in its current window.
    fn too_many_attempts(&self, key: &str, max_attempts: u32) -> bool;

    /// Records one hit, opening a `window`-long window if none is active.
    /// Returns the hit count in the current window.
    fn hit(&self, key: &str, window: Duration) -> u32;

    /// Checks the budget and records a hit if it allows one.
    ///
    /// Returns false without recording when the budget is exhausted.
    /// Implementations should override this to make the check and the hit
    /// one atomic step.
    fn attempt(&self, key: &str, max_attempts: u32, window: Duration) -> bool {
        if self.too_many_attempts(key, max_attempts) {
            return false;
        }
        self.hit(key, window);
        true
    }
}

/// Monotonic time source for rate windows.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, place_name: &str) -> Result<Coordinate, EnrichError> {
        (**self).geocode(place_name)
    }
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn compute_route_polyline(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<String, EnrichError> {
        (**self).compute_route_polyline(origin, destination)
    }
}

impl<T: NearbyPlaceProvider + ?Sized> NearbyPlaceProvider for &T {
    fn find_nearby_restaurants(
        &self,
        point: Coordinate,
        caller_id: Option<&str>,
    ) -> Result<Vec<RestaurantCandidate>, EnrichError> {
        (**self).find_nearby_restaurants(point, caller_id)
    }
}
