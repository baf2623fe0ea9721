//! Route enrichment: place names in, route samples with restaurants out.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::{EnrichmentConfig, GoogleMapsConfig};
use crate::coordinate::{Coordinate, RestaurantCandidate, RouteEnrichmentResult, RouteSample};
use crate::error::EnrichError;
use crate::google::GoogleMapsClient;
use crate::polyline::Polyline;
use crate::rate_limit::RateLimitedNearby;
use crate::resample::Resampler;
use crate::traits::{Geocoder, NearbyPlaceProvider, RateLimiter, RouteProvider};

/// Chains geocoding, routing, resampling and nearby search.
///
/// Every step must succeed; the first failure is returned and no partial
/// result is produced.
#[derive(Debug, Clone)]
pub struct RouteEnricher<G, R, N> {
    geocoder: G,
    routes: R,
    nearby: N,
    config: EnrichmentConfig,
}

/// Enricher wired to Google Maps with the nearby budget applied.
pub type GoogleRouteEnricher =
    RouteEnricher<GoogleMapsClient, GoogleMapsClient, RateLimitedNearby<GoogleMapsClient>>;

impl GoogleRouteEnricher {
    pub fn google(
        maps: GoogleMapsConfig,
        config: EnrichmentConfig,
        limiter: Arc<dyn RateLimiter>,
    ) -> Result<Self, reqwest::Error> {
        let client = GoogleMapsClient::new(maps)?;
        let nearby = RateLimitedNearby::new(client.clone(), limiter, config.nearby_budget);
        Ok(RouteEnricher::new(client.clone(), client, nearby, config))
    }
}

impl<G, R, N> RouteEnricher<G, R, N>
where
    G: Geocoder,
    R: RouteProvider,
    N: NearbyPlaceProvider + Sync,
{
    pub fn new(geocoder: G, routes: R, nearby: N, config: EnrichmentConfig) -> Self {
        Self {
            geocoder,
            routes,
            nearby,
            config,
        }
    }

    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Builds the route between two place names and the restaurants along it.
    ///
    /// `caller_id` is forwarded to every nearby lookup so a metered provider
    /// can charge the caller's budget.
    pub fn enrich(
        &self,
        origin_name: &str,
        destination_name: &str,
        caller_id: Option<&str>,
    ) -> Result<RouteEnrichmentResult, EnrichError> {
        let origin = self.geocoder.geocode(origin_name)?;
        let destination = self.geocoder.geocode(destination_name)?;
        debug!(?origin, ?destination, "geocoded route endpoints");

        let polyline = self.routes.compute_route_polyline(origin, destination)?;
        let points = Polyline::decode(&polyline)?.into_points();
        if points.len() < 2 {
            return Err(EnrichError::InsufficientGeometry {
                points: points.len(),
            });
        }

        let resampler = Resampler::new(self.config.sample_interval_meters, self.config.max_samples);
        let sample_points = resampler.resample(&points)?;
        debug!(
            route_points = points.len(),
            samples = sample_points.len(),
            "resampled route"
        );

        let lookups = self.lookup_all(&sample_points, caller_id)?;

        let mut samples = Vec::with_capacity(sample_points.len());
        let mut restaurant_names = Vec::new();
        for (coordinate, restaurants) in sample_points.into_iter().zip(lookups) {
            restaurant_names.extend(restaurants.iter().filter_map(|r| r.name.clone()));
            samples.push(RouteSample {
                coordinate,
                restaurants,
            });
        }

        info!(
            origin = origin_name,
            destination = destination_name,
            samples = samples.len(),
            restaurants = restaurant_names.len(),
            "route enriched"
        );

        Ok(RouteEnrichmentResult {
            polyline,
            samples,
            restaurant_names,
        })
    }

    /// Nearby results per sample, in sample order.
    fn lookup_all(
        &self,
        points: &[Coordinate],
        caller_id: Option<&str>,
    ) -> Result<Vec<Vec<RestaurantCandidate>>, EnrichError> {
        let nearby = &self.nearby;
        if !self.config.parallel_lookups {
            return points
                .iter()
                .map(|point| nearby.find_nearby_restaurants(*point, caller_id))
                .collect();
        }

        // Indexed collect keeps sample order; the first failure by sample
        // order wins, matching the sequential path.
        let results: Vec<_> = points
            .par_iter()
            .map(|point| nearby.find_nearby_restaurants(*point, caller_id))
            .collect();
        results.into_iter().collect()
    }
}
