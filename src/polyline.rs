//! Encoded polyline decoding for route geometries.
//!
//! The directions service ships each route's path as an encoded polyline
//! string: per point, a latitude and a longitude delta, each zig-zag encoded
//! and split into 5-bit chunks offset into printable ASCII. Decoding happens
//! here, at the boundary; everything downstream works on coordinates.

use thiserror::Error;

use crate::coordinate::Coordinate;

/// Fixed-point precision of the encoding (five decimal places).
const PRECISION: f64 = 1e5;

/// Offset added to every chunk so it lands in printable ASCII.
const CHUNK_OFFSET: u8 = 63;

const CHUNK_CONTINUATION: i64 = 0x20;
const CHUNK_VALUE_MASK: i64 = 0x1f;

/// No valid coordinate delta needs more than seven chunks (35 bits).
const MAX_SHIFT: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("polyline truncated at byte {offset}: chunk sequence or coordinate pair is incomplete")]
    Truncated { offset: usize },

    #[error("invalid polyline character {found:?} at byte {offset}")]
    InvalidCharacter { found: char, offset: usize },

    #[error("polyline value starting before byte {offset} overflows")]
    Overflow { offset: usize },
}

/// A polyline representing a route geometry as decoded coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    points: Vec<Coordinate>,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    /// Decodes an encoded polyline string.
    ///
    /// An empty string is an empty path. Malformed input fails as a whole;
    /// no partially decoded path is ever returned.
    pub fn decode(encoded: &str) -> Result<Self, DecodeError> {
        decode(encoded).map(Self::new)
    }

    /// Returns a reference to the coordinate points, in path order.
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

/// Decodes an encoded polyline into coordinates in path order.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, DecodeError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        latitude += next_value(bytes, &mut index)?;
        longitude += next_value(bytes, &mut index)?;
        points.push(Coordinate::new(
            latitude as f64 / PRECISION,
            longitude as f64 / PRECISION,
        ));
    }

    Ok(points)
}

/// Reads one zig-zag encoded signed value starting at `index`.
fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, DecodeError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift: u32 = 0;

    loop {
        let offset = *index;
        let byte = *bytes.get(offset).ok_or(DecodeError::Truncated { offset })?;
        if !(CHUNK_OFFSET..=b'~').contains(&byte) {
            return Err(DecodeError::InvalidCharacter {
                found: char::from(byte),
                offset,
            });
        }
        if shift > MAX_SHIFT {
            return Err(DecodeError::Overflow { offset: start });
        }

        let chunk = i64::from(byte - CHUNK_OFFSET);
        *index += 1;
        result |= (chunk & CHUNK_VALUE_MASK) << shift;
        shift += 5;

        if chunk & CHUNK_CONTINUATION == 0 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
