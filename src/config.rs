//! Settings for the Google adapters and the enrichment pipeline.

use std::env;
use std::str::FromStr;

use crate::rate_limit::RateBudget;
use crate::resample::{DEFAULT_INTERVAL_METERS, MAX_SAMPLES};

pub const ENV_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const ENV_PLACES_BASE_URL: &str = "GOOGLE_PLACES_BASE_URL";
pub const ENV_ROUTES_BASE_URL: &str = "GOOGLE_ROUTES_BASE_URL";
pub const ENV_LANGUAGE: &str = "GOOGLE_MAPS_LANGUAGE";
pub const ENV_TIMEOUT_SECS: &str = "GOOGLE_MAPS_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    /// Sent as `X-Goog-Api-Key`. Empty means unconfigured.
    pub api_key: String,
    pub places_base_url: String,
    pub routes_base_url: String,
    /// Language hint for place names and addresses.
    pub language_code: String,
    pub nearby_radius_meters: f64,
    /// Deadline for each upstream call.
    pub timeout_secs: u64,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            places_base_url: "https://places.googleapis.com".to_string(),
            routes_base_url: "https://routes.googleapis.com".to_string(),
            language_code: "ja".to_string(),
            nearby_radius_meters: 100.0,
            timeout_secs: 10,
        }
    }
}

impl GoogleMapsConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by any `GOOGLE_*` variables that are set.
    ///
    /// A missing key is not an error here; every client call reports it.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_key: lookup(ENV_API_KEY)
                .map(|key| key.trim().to_string())
                .unwrap_or(defaults.api_key),
            places_base_url: lookup(ENV_PLACES_BASE_URL).unwrap_or(defaults.places_base_url),
            routes_base_url: lookup(ENV_ROUTES_BASE_URL).unwrap_or(defaults.routes_base_url),
            language_code: lookup(ENV_LANGUAGE).unwrap_or(defaults.language_code),
            nearby_radius_meters: defaults.nearby_radius_meters,
            timeout_secs: parse_or(lookup(ENV_TIMEOUT_SECS), defaults.timeout_secs),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub sample_interval_meters: f64,
    pub max_samples: usize,
    /// Run nearby lookups on the rayon pool. Output order is unchanged.
    pub parallel_lookups: bool,
    pub nearby_budget: RateBudget,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            sample_interval_meters: DEFAULT_INTERVAL_METERS,
            max_samples: MAX_SAMPLES,
            parallel_lookups: false,
            nearby_budget: RateBudget::NEARBY_RESTAURANTS,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}
