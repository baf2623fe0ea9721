//! Errors returned by the enrichment pipeline.
//!
//! Every failure aborts the whole enrichment. Callers branch on
//! [`EnrichError::kind`]; the payloads carry context for reporting.

use std::fmt;

use thiserror::Error;

use crate::polyline::PolylineError;
use crate::resample::ResampleError;

/// Boxed cause of an upstream failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Upstream API that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocoding,
    Routes,
    NearbySearch,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Geocoding => "places text search",
            Service::Routes => "routes",
            Service::NearbySearch => "places nearby search",
        };
        f.write_str(name)
    }
}

/// A setting that prevents the pipeline from running at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssue {
    MissingApiKey,
    InvalidSampleInterval,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::MissingApiKey => f.write_str("Google Maps API key is not configured"),
            ConfigIssue::InvalidSampleInterval => {
                f.write_str("sample interval must be a positive distance")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("configuration error: {0}")]
    Config(ConfigIssue),

    /// Transport failure, timeout, or non-success response.
    #[error("{service} request failed")]
    Upstream {
        service: Service,
        #[source]
        source: BoxError,
    },

    #[error("no results for place '{place}'")]
    NoResults { place: String },

    #[error("first result for place '{place}' has no usable coordinates")]
    MissingCoordinates { place: String },

    #[error("route response has no encoded polyline")]
    MissingPolyline,

    #[error("route decoded to {points} point(s), at least 2 required")]
    InsufficientGeometry { points: usize },

    #[error("route polyline is malformed at byte {offset}")]
    MalformedPolyline { offset: usize },

    #[error("route needs more than {cap} samples")]
    RouteTooLong { cap: usize },

    #[error("rate budget of {max_attempts} exhausted for '{key}'")]
    RateLimited { key: String, max_attempts: u32 },
}

/// Payload-free discriminant of [`EnrichError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Upstream,
    NoResults,
    MissingCoordinates,
    MissingPolyline,
    InsufficientGeometry,
    MalformedPolyline,
    RouteTooLong,
    RateLimited,
}

impl ErrorKind {
    pub fn is_rate_limited(self) -> bool {
        self == ErrorKind::RateLimited
    }

    /// Failures caused by the upstream data for this particular request
    /// rather than by the server or its budget.
    pub fn is_unresolvable_input(self) -> bool {
        matches!(
            self,
            ErrorKind::NoResults
                | ErrorKind::MissingCoordinates
                | ErrorKind::MissingPolyline
                | ErrorKind::InsufficientGeometry
                | ErrorKind::MalformedPolyline
        )
    }
}

impl EnrichError {
    pub fn upstream(service: Service, source: impl Into<BoxError>) -> Self {
        EnrichError::Upstream {
            service,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrichError::Config(_) => ErrorKind::Config,
            EnrichError::Upstream { .. } => ErrorKind::Upstream,
            EnrichError::NoResults { .. } => ErrorKind::NoResults,
            EnrichError::MissingCoordinates { .. } => ErrorKind::MissingCoordinates,
            EnrichError::MissingPolyline => ErrorKind::MissingPolyline,
            EnrichError::InsufficientGeometry { .. } => ErrorKind::InsufficientGeometry,
            EnrichError::MalformedPolyline { .. } => ErrorKind::MalformedPolyline,
            EnrichError::RouteTooLong { .. } => ErrorKind::RouteTooLong,
            EnrichError::RateLimited { .. } => ErrorKind::RateLimited,
        }
    }
}

impl From<PolylineError> for EnrichError {
    fn from(err: PolylineError) -> Self {
        match err {
            PolylineError::Malformed { offset } => EnrichError::MalformedPolyline { offset },
        }
    }
}

impl From<ResampleError> for EnrichError {
    fn from(err: ResampleError) -> Self {
        match err {
            ResampleError::RouteTooLong { cap } => EnrichError::RouteTooLong { cap },
            ResampleError::InvalidInterval { .. } => {
                EnrichError::Config(ConfigIssue::InvalidSampleInterval)
            }
        }
    }
}
