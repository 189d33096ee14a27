//! Offline directions provider driving along a Manhattan road grid.
use route_relief::directions::polyline;
use route_relief::directions::{DirectionsProvider, DirectionsRequest, Geocoder, Waypoint};
use route_relief::error::{Error, Result};
use route_relief::grid::LatLng;
use serde_json::json;

/// Routes run north/south along the origin's meridian, then east/west along the
/// destination's parallel. Parallels that are multiples of `highway_every` are driven
/// at highway speed. Destinations inside the lake have no route.
#[derive(Debug, Clone)]
pub struct GridRoads {
    /// Where address waypoints resolve to.
    pub home: LatLng,
    /// Seconds per degree on ordinary roads.
    pub street_pace: f64,
    /// Seconds per degree on highways.
    pub highway_pace: f64,
    pub highway_every: f64,
    lake: Option<(LatLng, LatLng)>,
    calls: usize,
}

const POINTS_PER_STEP: usize = 8;

impl GridRoads {
    pub fn new(home: LatLng) -> Self {
        Self {
            home,
            street_pace: 60_000.0,
            highway_pace: 15_000.0,
            highway_every: 0.04,
            lake: None,
            calls: 0,
        }
    }

    /// Destinations inside the rectangle `min..max` return `ZERO_RESULTS`.
    pub fn with_lake(mut self, min: LatLng, max: LatLng) -> Self {
        self.lake = Some((min, max));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    fn resolve(&self, waypoint: &Waypoint) -> LatLng {
        match waypoint {
            Waypoint::Coordinate(p) => *p,
            Waypoint::Address(_) => self.home,
        }
    }

    fn in_lake(&self, p: LatLng) -> bool {
        self.lake.is_some_and(|(min, max)| {
            (min.lat..=max.lat).contains(&p.lat) && (min.lng..=max.lng).contains(&p.lng)
        })
    }

    fn east_pace(&self, lat: f64) -> f64 {
        let lanes = lat / self.highway_every;
        if (lanes - lanes.round()).abs() < 1e-6 {
            self.highway_pace
        } else {
            self.street_pace
        }
    }
}

fn line(from: LatLng, to: LatLng) -> Vec<LatLng> {
    (0..=POINTS_PER_STEP)
        .map(|i| {
            let t = i as f64 / POINTS_PER_STEP as f64;
            LatLng::new(
                from.lat + (to.lat - from.lat) * t,
                from.lng + (to.lng - from.lng) * t,
            )
        })
        .collect()
}

fn step(points: &[LatLng], seconds: f64, metres: f64) -> serde_json::Value {
    json!({
        "travel_mode": "DRIVING",
        "duration": {
            "value": seconds.round(),
            "text": format!("{} mins", (seconds / 60.0).round())
        },
        "distance": { "value": metres.round(), "text": "" },
        "polyline": { "points": polyline::encode(points) }
    })
}

impl DirectionsProvider for GridRoads {
    fn fetch(&mut self, request: &DirectionsRequest) -> Result<String> {
        self.calls += 1;
        let from = self.resolve(&request.origin);
        let to = self.resolve(&request.destination);

        if self.in_lake(to) {
            return Ok(json!({ "status": "ZERO_RESULTS", "routes": [] }).to_string());
        }

        let corner = LatLng::new(to.lat, from.lng);
        let mut steps = Vec::new();
        let north = (to.lat - from.lat).abs();
        if north > 0.0 {
            steps.push(step(
                &line(from, corner),
                north * self.street_pace,
                north * 111_000.0,
            ));
        }
        let east = (to.lng - from.lng).abs();
        if east > 0.0 {
            steps.push(step(
                &line(corner, to),
                east * self.east_pace(to.lat),
                east * 87_000.0,
            ));
        }
        if steps.is_empty() {
            steps.push(step(&[from], 0.0, 0.0));
        }

        let body = json!({
            "status": "OK",
            "routes": [{ "summary": "grid roads", "legs": [{ "steps": steps }] }]
        });
        Ok(body.to_string())
    }
}

impl Geocoder for GridRoads {
    fn geocode(&mut self, address: &str) -> Result<LatLng> {
        if address.trim().is_empty() {
            return Err(Error::provider("INVALID_REQUEST", "empty address"));
        }
        Ok(self.home)
    }
}
