//! Helpers for the HTTP layer that fronts the enricher.
//!
//! The layer itself (routing, authentication, storage) lives elsewhere.
//! These types keep its validation rules and error translation next to the
//! pipeline they guard.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{EnrichError, ErrorKind};

/// Longest accepted place name or restaurant name, in characters.
pub const MAX_NAME_CHARS: usize = 255;

/// Invalid input rejected before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Body of a route enrichment request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: String,
    pub destination: String,
}

impl RouteRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// Checks both names and returns them trimmed.
    pub fn validate(&self) -> Result<(&str, &str), RequestError> {
        let origin = check_name("origin", &self.origin)?;
        let destination = check_name("destination", &self.destination)?;
        Ok((origin, destination))
    }
}

/// A user's saved enrichment outcome, as handed to storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRouteRecord {
    pub origin: String,
    pub destination: String,
    #[serde(rename = "restaurants_names")]
    pub restaurant_names: Vec<String>,
}

impl SavedRouteRecord {
    pub fn validate(&self) -> Result<(), RequestError> {
        check_name("origin", &self.origin)?;
        check_name("destination", &self.destination)?;
        for name in &self.restaurant_names {
            if name.chars().count() > MAX_NAME_CHARS {
                return Err(RequestError::TooLong {
                    field: "restaurants_names",
                    max: MAX_NAME_CHARS,
                });
            }
        }
        Ok(())
    }
}

fn check_name<'a>(field: &'static str, value: &'a str) -> Result<&'a str, RequestError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RequestError::Missing { field });
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(RequestError::TooLong {
            field,
            max: MAX_NAME_CHARS,
        });
    }
    Ok(trimmed)
}

/// HTTP status the request layer should answer with.
pub fn status_code(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::RateLimited => 429,
        ErrorKind::Config | ErrorKind::Upstream => 500,
        ErrorKind::NoResults
        | ErrorKind::MissingCoordinates
        | ErrorKind::MissingPolyline
        | ErrorKind::InsufficientGeometry
        | ErrorKind::MalformedPolyline
        | ErrorKind::RouteTooLong => 422,
    }
}

/// Message safe to show the caller.
///
/// Rate limiting keeps its own message so clients know to back off; server
/// failures never expose upstream details.
pub fn user_message(err: &EnrichError) -> String {
    match err.kind() {
        ErrorKind::RateLimited => "Too many requests. Please wait a minute and try again.".to_string(),
        ErrorKind::Config | ErrorKind::Upstream => "Failed to fetch route polyline.".to_string(),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Service;

    #[test]
    fn test_validate_trims_names() {
        let request = RouteRequest::new("  Tokyo Station ", "Kyoto Station");
        assert_eq!(request.validate(), Ok(("Tokyo Station", "Kyoto Station")));
    }

    #[test]
    fn test_validate_requires_both_names() {
        assert_eq!(
            RouteRequest::new("", "Kyoto Station").validate(),
            Err(RequestError::Missing { field: "origin" })
        );
        assert_eq!(
            RouteRequest::new("Tokyo Station", "   ").validate(),
            Err(RequestError::Missing {
                field: "destination"
            })
        );
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        // 255 three-byte characters are within the limit.
        let name = "駅".repeat(MAX_NAME_CHARS);
        assert!(RouteRequest::new(name.clone(), "京都駅").validate().is_ok());

        let too_long = format!("{name}駅");
        assert_eq!(
            RouteRequest::new(too_long, "京都駅").validate(),
            Err(RequestError::TooLong {
                field: "origin",
                max: MAX_NAME_CHARS
            })
        );
    }

    #[test]
    fn test_saved_record_validation() {
        let mut record = SavedRouteRecord {
            origin: "東京駅".to_string(),
            destination: "京都駅".to_string(),
            restaurant_names: vec!["Restaurant Alpha".to_string()],
        };
        assert!(record.validate().is_ok());

        record.restaurant_names.push("x".repeat(MAX_NAME_CHARS + 1));
        assert!(matches!(
            record.validate(),
            Err(RequestError::TooLong {
                field: "restaurants_names",
                ..
            })
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_code(ErrorKind::RateLimited), 429);
        assert_eq!(status_code(ErrorKind::Upstream), 500);
        assert_eq!(status_code(ErrorKind::Config), 500);
        assert_eq!(status_code(ErrorKind::NoResults), 422);
        assert_eq!(status_code(ErrorKind::RouteTooLong), 422);
    }

    #[test]
    fn test_user_message_hides_upstream_detail() {
        let err = EnrichError::upstream(Service::Routes, "403 API key invalid");
        assert_eq!(user_message(&err), "Failed to fetch route polyline.");

        let err = EnrichError::RateLimited {
            key: "nearby-restaurants:user:1".to_string(),
            max_attempts: 30,
        };
        assert!(user_message(&err).starts_with("Too many requests"));

        let err = EnrichError::NoResults {
            place: "Atlantis".to_string(),
        };
        assert!(user_message(&err).contains("Atlantis"));
    }
}
