//! Fixed-interval resampling of decoded route geometry.
//!
//! The resampler walks the route by arc length and emits a point every
//! `interval_meters`, always keeping the route's first and last positions.
//! The sample count is capped because every sample costs one nearby-place
//! lookup downstream.

use std::collections::HashSet;

use thiserror::Error;

use crate::coordinate::Coordinate;
use crate::haversine::{haversine_meters, interpolate};

/// Default spacing between samples.
pub const DEFAULT_INTERVAL_METERS: f64 = 200.0;

/// Default upper bound on emitted samples.
pub const MAX_SAMPLES: usize = 500;

/// The final input point is re-attached when the last sample is further away.
const ENDPOINT_TOLERANCE_METERS: f64 = 0.01;

/// Errors from [`Resampler::resample`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    #[error("route needs more than {cap} samples")]
    RouteTooLong { cap: usize },
    #[error("sample interval must be a positive distance, got {interval}")]
    InvalidInterval { interval: f64 },
}

#[derive(Debug, Clone)]
pub struct Resampler {
    pub interval_meters: f64,
    pub max_samples: usize,
}

impl Default for Resampler {
    fn default() -> Self {
        Self {
            interval_meters: DEFAULT_INTERVAL_METERS,
            max_samples: MAX_SAMPLES,
        }
    }
}

impl Resampler {
    pub fn new(interval_meters: f64, max_samples: usize) -> Self {
        Self {
            interval_meters,
            max_samples,
        }
    }

    /// Resamples `points` at `self.interval_meters`.
    ///
    /// Inputs with one point or none are returned as-is. Otherwise the output
    /// starts at the first input point, ends within the endpoint tolerance of
    /// the last one, and holds no two points equal at 6 decimal places.
    pub fn resample(&self, points: &[Coordinate]) -> Result<Vec<Coordinate>, ResampleError> {
        if points.len() <= 1 {
            return Ok(points.to_vec());
        }
        if !(self.interval_meters.is_finite() && self.interval_meters > 0.0) {
            return Err(ResampleError::InvalidInterval {
                interval: self.interval_meters,
            });
        }

        let mut samples = vec![points[0]];
        let mut since_last_sample = 0.0;

        for segment in points.windows(2) {
            let (start, end) = (segment[0], segment[1]);
            let segment_length = haversine_meters(start, end);
            if segment_length == 0.0 {
                continue;
            }

            let mut position = start;
            let mut remaining = segment_length;

            while since_last_sample + remaining >= self.interval_meters {
                let needed = self.interval_meters - since_last_sample;
                let sample = interpolate(position, end, needed / remaining);
                self.push(&mut samples, sample)?;

                position = sample;
                remaining = haversine_meters(position, end);
                since_last_sample = 0.0;

                if remaining == 0.0 {
                    break;
                }
            }

            since_last_sample += remaining;
        }

        let last_point = points[points.len() - 1];
        let last_sample = samples[samples.len() - 1];
        if haversine_meters(last_sample, last_point) > ENDPOINT_TOLERANCE_METERS {
            self.push(&mut samples, last_point)?;
        }

        Ok(unique_samples(samples))
    }

    fn push(&self, samples: &mut Vec<Coordinate>, point: Coordinate) -> Result<(), ResampleError> {
        if samples.len() >= self.max_samples {
            return Err(ResampleError::RouteTooLong {
                cap: self.max_samples,
            });
        }
        samples.push(point);
        Ok(())
    }
}

/// Resamples with the default cap.
pub fn resample(points: &[Coordinate], interval_meters: f64) -> Result<Vec<Coordinate>, ResampleError> {
    Resampler::new(interval_meters, MAX_SAMPLES).resample(points)
}

/// Drops points that repeat an earlier one at 6 decimal places.
fn unique_samples(samples: Vec<Coordinate>) -> Vec<Coordinate> {
    let mut seen = HashSet::with_capacity(samples.len());
    samples
        .into_iter()
        .filter(|point| seen.insert(rounded_key(point)))
        .collect()
}

fn rounded_key(point: &Coordinate) -> (i64, i64) {
    (
        (point.latitude * 1e6).round() as i64,
        (point.longitude * 1e6).round() as i64,
    )
}
