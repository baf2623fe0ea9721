//! Encoded polyline codec for route geometries.
//!
//! Routes arrive from the provider in Google's encoded polyline format:
//! signed deltas of latitude and longitude scaled by 1e5, written as
//! 5-bit chunks offset by 63. Decoding happens once at the boundary; the
//! rest of the crate works on [`Coordinate`] sequences.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordinate::Coordinate;

/// Scale factor between degrees and the encoded integer grid.
const PRECISION: f64 = 1e5;

/// First byte of the encoding alphabet (`?`).
const CHUNK_OFFSET: u8 = 63;

/// Continuation flag within a chunk.
const CONTINUATION_BIT: i64 = 0x20;

/// A 32-bit delta never needs more than seven 5-bit chunks.
const MAX_SHIFT: u32 = 35;

/// Errors from [`Polyline::decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    /// Input ended mid-value, held a byte outside the encoding alphabet, or
    /// encoded a value wider than the format allows.
    #[error("malformed polyline at byte {offset}")]
    Malformed { offset: usize },
}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string, origin first.
    ///
    /// An empty string decodes to an empty polyline.
    pub fn decode(encoded: &str) -> Result<Self, PolylineError> {
        let bytes = encoded.as_bytes();
        let mut index = 0;
        let mut lat: i64 = 0;
        let mut lng: i64 = 0;
        let mut points = Vec::new();

        while index < bytes.len() {
            lat += next_value(bytes, &mut index)?;
            lng += next_value(bytes, &mut index)?;
            points.push(Coordinate::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
        }

        Ok(Self { points })
    }

    /// Encodes the points at 1e-5 precision.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        let mut prev_lat: i64 = 0;
        let mut prev_lng: i64 = 0;

        for point in &self.points {
            let lat = (point.latitude * PRECISION).round() as i64;
            let lng = (point.longitude * PRECISION).round() as i64;
            push_value(&mut out, lat - prev_lat);
            push_value(&mut out, lng - prev_lng);
            prev_lat = lat;
            prev_lng = lng;
        }

        out
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Coordinate> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Reads one zigzag-encoded signed value starting at `*index`.
fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let offset = *index;
        let byte = *bytes.get(offset).ok_or(PolylineError::Malformed { offset })?;
        if !(CHUNK_OFFSET..=126).contains(&byte) || shift >= MAX_SHIFT {
            return Err(PolylineError::Malformed { offset });
        }
        *index += 1;

        let chunk = i64::from(byte - CHUNK_OFFSET);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

fn push_value(out: &mut String, value: i64) {
    let mut rest = if value < 0 { !(value << 1) } else { value << 1 };

    while rest >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (rest & 0x1f)) as u8 + CHUNK_OFFSET;
        out.push(char::from(chunk));
        rest >>= 5;
    }
    out.push(char::from(rest as u8 + CHUNK_OFFSET));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(f64, f64)]) -> Vec<Coordinate> {
        points.iter().copied().map(Coordinate::from).collect()
    }

    #[test]
    fn test_new_and_points() {
        let points = coords(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]);
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.points(), &points[..]);
        assert_eq!(polyline.len(), 3);
    }

    #[test]
    fn test_into_points() {
        let points = coords(&[(38.5, -120.2), (40.7, -120.95)]);
        let polyline = Polyline::new(points.clone());
        assert_eq!(polyline.into_points(), points);
    }

    #[test]
    fn test_decode_reference_example() {
        let polyline = Polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(
            polyline.points(),
            &coords(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)])[..]
        );
    }

    #[test]
    fn test_decode_station_route() {
        let polyline = Polyline::decode("w~wxEqgatYcBcBcBcB").unwrap();
        assert_eq!(
            polyline.points(),
            &coords(&[
                (35.68124, 139.76713),
                (35.68174, 139.76763),
                (35.68224, 139.76813),
            ])[..]
        );
    }

    #[test]
    fn test_decode_empty_string() {
        let polyline = Polyline::decode("").unwrap();
        assert!(polyline.is_empty());
    }

    #[test]
    fn test_decode_truncated_value() {
        // "w~wxE" is a complete latitude; the longitude never starts.
        assert_eq!(
            Polyline::decode("w~wxE"),
            Err(PolylineError::Malformed { offset: 5 })
        );
        // Continuation bit set on the final byte.
        assert_eq!(
            Polyline::decode("w~wxEqgat"),
            Err(PolylineError::Malformed { offset: 9 })
        );
    }

    #[test]
    fn test_decode_rejects_bytes_outside_alphabet() {
        assert_eq!(
            Polyline::decode("w~ wxE"),
            Err(PolylineError::Malformed { offset: 2 })
        );
    }

    #[test]
    fn test_encode_matches_reference() {
        let polyline = Polyline::new(coords(&[(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)]));
        assert_eq!(polyline.encode(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn test_encode_decode_negative_and_zero_deltas() {
        let points = coords(&[(0.0, 0.0), (-0.00001, 0.00001), (-0.00001, 0.00001), (-89.99999, 179.99999)]);
        let decoded = Polyline::decode(&Polyline::new(points.clone()).encode()).unwrap();
        assert_eq!(decoded.into_points(), points);
    }
}
