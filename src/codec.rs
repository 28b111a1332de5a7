//! Encoded polyline codec.
//!
//! Decodes the compact delta + zig-zag + base-64-like path format returned by
//! routing providers, at a fixed precision of 1e-5 degrees. The decoder walks
//! UTF-16 code units and uses 32-bit signed bit arithmetic so that it agrees
//! bit-for-bit with the JavaScript reference decoder, including on input that
//! contains characters outside the encoding alphabet.
//!
//! Encoding goes through the `polyline` crate over a `geo::LineString`.

use geo::{Coord, LineString};
use log::warn;

use crate::error::{DecodeError, Result, RouteError};
use crate::GeoPoint;

/// Fixed-point precision of the wire format (5 decimal places).
pub const PRECISION: f64 = 1e5;

/// Number of decimal places passed to the encoder.
const PRECISION_DIGITS: u32 = 5;

/// Value subtracted from each code unit to obtain a 6-bit chunk.
const CHAR_OFFSET: i32 = 63;

/// Continuation bit of a chunk.
const CONTINUATION: i32 = 0x20;

/// Payload bits of a chunk.
const CHUNK_MASK: i32 = 0x1f;

/// Decode an encoded polyline, failing on truncated input.
///
/// The error carries every point decoded before the truncation.
///
/// # Example
/// ```
/// use route_geometry::try_decode_polyline;
///
/// let points = try_decode_polyline("_p~iF~ps|U").unwrap();
/// assert_eq!(points.len(), 1);
/// assert!((points[0].latitude - 38.5).abs() < 1e-9);
///
/// let err = try_decode_polyline("_p~iF~ps|U_ulL").unwrap_err();
/// assert_eq!(err.partial.len(), 1);
/// ```
pub fn try_decode_polyline(encoded: &str) -> std::result::Result<Vec<GeoPoint>, DecodeError> {
    let units: Vec<u16> = encoded.encode_utf16().collect();
    let mut points = Vec::with_capacity(units.len() / 4);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < units.len() {
        let (dlat, dlng) = match read_value(&units, &mut index)
            .and_then(|dlat| read_value(&units, &mut index).map(|dlng| (dlat, dlng)))
        {
            Some(deltas) => deltas,
            None => {
                return Err(DecodeError {
                    offset: index,
                    partial: points,
                })
            }
        };

        lat += i64::from(dlat);
        lng += i64::from(dlng);
        points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Decode an encoded polyline, keeping the partial result on truncation.
///
/// A broken path is still drawn as far as it decodes; the failure is logged.
pub fn decode_polyline(encoded: &str) -> Vec<GeoPoint> {
    match try_decode_polyline(encoded) {
        Ok(points) => points,
        Err(e) => {
            warn!("[PolylineCodec] {}, keeping partial path", e);
            e.into_partial()
        }
    }
}

/// Read one zig-zag encoded value, advancing `index`.
///
/// Returns `None` when the input ends before a chunk without the
/// continuation bit.
fn read_value(units: &[u16], index: &mut usize) -> Option<i32> {
    let mut result: i32 = 0;
    let mut shift: u32 = 0;

    loop {
        let unit = *units.get(*index)?;
        *index += 1;

        let byte = i32::from(unit) - CHAR_OFFSET;
        // JS shifts count modulo 32
        result |= (byte & CHUNK_MASK).wrapping_shl(shift);
        shift = shift.wrapping_add(5);

        if byte < CONTINUATION {
            break;
        }
    }

    Some(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode points into the polyline wire format at 1e-5 precision.
///
/// Fails with [`RouteError::InvalidCoordinates`] if any point is out of range
/// or not finite.
pub fn encode_polyline(points: &[GeoPoint]) -> Result<String> {
    if let Some(bad) = points.iter().find(|p| !p.is_valid()) {
        return Err(RouteError::InvalidCoordinates {
            message: format!("({}, {})", bad.latitude, bad.longitude),
        });
    }

    // geo expects (x, y) = (lng, lat)
    let line: LineString<f64> = LineString::new(
        points
            .iter()
            .map(|p| Coord {
                x: p.longitude,
                y: p.latitude,
            })
            .collect(),
    );

    polyline::encode_coordinates(line, PRECISION_DIGITS).map_err(|e| {
        RouteError::InvalidCoordinates {
            message: e.to_string(),
        }
    })
}
