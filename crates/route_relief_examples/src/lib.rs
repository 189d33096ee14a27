#![forbid(unsafe_code)]

mod export;
mod google;
mod synthetic;

pub use export::{write_relief, ReliefExport};
pub use google::{GoogleMaps, API_KEY_ENV};
pub use synthetic::GridRoads;

use route_relief::directions::Waypoint;
use route_relief::grid::LatLng;
use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Parse `"lat,lng"` as a coordinate; anything else is an address.
pub fn parse_waypoint(text: &str) -> Waypoint {
    let parsed = text.split_once(',').and_then(|(lat, lng)| {
        let lat = lat.trim().parse::<f64>().ok()?;
        let lng = lng.trim().parse::<f64>().ok()?;
        Some(LatLng::new(lat, lng))
    });
    match parsed {
        Some(p) if p.is_finite() => Waypoint::Coordinate(p),
        _ => Waypoint::Address(text.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates_and_addresses() {
        assert_eq!(
            parse_waypoint("38.2, -85.6"),
            Waypoint::Coordinate(LatLng::new(38.2, -85.6))
        );
        assert_eq!(
            parse_waypoint("Medora, KY"),
            Waypoint::Address("Medora, KY".into())
        );
        assert_eq!(
            parse_waypoint(" 700 N Hurstbourne Pkwy "),
            Waypoint::Address("700 N Hurstbourne Pkwy".into())
        );
    }
}
