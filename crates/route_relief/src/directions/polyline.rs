//! Codec for the encoded polyline format used by directions responses.
//!
//! Each coordinate is a pair of zig-zag varints (5-bit groups offset by 63) holding the
//! delta from the previous point in units of 1e-5 degrees.
use crate::error::{Error, Result};
use crate::grid::LatLng;

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline into coordinates.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::with_capacity(bytes.len() / 4);
    let mut index = 0usize;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lng += next_delta(bytes, &mut index)?;
        points.push(LatLng::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Encode coordinates, rounding each to 1e-5 degrees.
pub fn encode(points: &[LatLng]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let (mut prev_lat, mut prev_lng) = (0i64, 0i64);
    for p in points {
        let lat = (p.lat * PRECISION).round() as i64;
        let lng = (p.lng * PRECISION).round() as i64;
        push_delta(lat - prev_lat, &mut out);
        push_delta(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }
    out
}

fn push_delta(delta: i64, out: &mut String) {
    let mut v = if delta < 0 { !(delta << 1) } else { delta << 1 };
    while v >= 0x20 {
        out.push(char::from(((0x20 | (v & 0x1f)) + 63) as u8));
        v >>= 5;
    }
    out.push(char::from((v + 63) as u8));
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let mut result = 0i64;
    let mut shift = 0u32;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(Error::MalformedResponse(format!(
                "polyline truncated at byte {}",
                *index
            )));
        };
        if !(63..=126).contains(&byte) {
            return Err(Error::MalformedResponse(format!(
                "invalid polyline byte 0x{byte:02x} at {}",
                *index
            )));
        }
        *index += 1;

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            return Err(Error::MalformedResponse("polyline varint overflow".into()));
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
