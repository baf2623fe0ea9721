//! route-restaurants core
//!
//! Turns an origin and a destination place name into a driving route and
//! the restaurants found along it, by chaining geocoding, route computation
//! and nearby-place search around a fixed-interval polyline resampler.

pub mod boundary;
pub mod config;
pub mod coordinate;
pub mod enrich;
pub mod error;
pub mod google;
pub mod haversine;
pub mod polyline;
pub mod rate_limit;
pub mod resample;
pub mod traits;

pub use coordinate::{Coordinate, RestaurantCandidate, RouteEnrichmentResult, RouteSample};
pub use enrich::{GoogleRouteEnricher, RouteEnricher};
pub use error::{EnrichError, ErrorKind};
