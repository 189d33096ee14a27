//! Quantization of continuous coordinates into grid cells.
//!
//! [`CoordinateGrid`] maps a `(lat, lng)` pair onto a regular lattice anchored at the
//! domain minimum. Indices are not clamped, so coordinates outside the configured
//! rectangle still quantize to well-defined (negative or over-range) cells.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A continuous geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Identity of a quantized cell: `(lat index, lng index)` relative to the grid minimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell(
    /// Index along the latitude axis.
    pub i64,
    /// Index along the longitude axis.
    pub i64,
);

/// Serializable description of a sampling grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Lower corner of the domain.
    pub min: LatLng,
    /// Upper corner of the domain.
    pub max: LatLng,
    /// Number of steps along `(lat, lng)`.
    pub steps: [u32; 2],
}

impl GridSpec {
    pub fn new(min: LatLng, max: LatLng, steps: [u32; 2]) -> Self {
        Self { min, max, steps }
    }
}

/// Regular lattice over a lat/lng rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateGrid {
    min: LatLng,
    max: LatLng,
    steps: [u32; 2],
    step: LatLng,
}

impl CoordinateGrid {
    /// Build a grid from its corners and per-axis step counts.
    pub fn new(min: LatLng, max: LatLng, steps: [u32; 2]) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidConfig("grid bounds must be finite".into()));
        }
        if max.lat <= min.lat || max.lng <= min.lng {
            return Err(Error::InvalidConfig(format!(
                "grid max ({max}) must exceed min ({min}) on both axes"
            )));
        }
        if steps[0] == 0 || steps[1] == 0 {
            return Err(Error::InvalidConfig("grid steps must be > 0".into()));
        }

        let step = LatLng::new(
            (max.lat - min.lat) / steps[0] as f64,
            (max.lng - min.lng) / steps[1] as f64,
        );
        Ok(Self {
            min,
            max,
            steps,
            step,
        })
    }

    pub fn from_spec(spec: &GridSpec) -> Result<Self> {
        Self::new(spec.min, spec.max, spec.steps)
    }

    pub fn min(&self) -> LatLng {
        self.min
    }

    pub fn max(&self) -> LatLng {
        self.max
    }

    pub fn steps(&self) -> [u32; 2] {
        self.steps
    }

    /// Per-axis step size in degrees.
    pub fn step_size(&self) -> LatLng {
        self.step
    }

    /// Quantize a coordinate to its cell identity.
    pub fn cell(&self, p: LatLng) -> GridCell {
        let ilat = ((p.lat - self.min.lat) / self.step.lat).round();
        let ilng = ((p.lng - self.min.lng) / self.step.lng).round();
        GridCell(ilat as i64, ilng as i64)
    }

    /// Continuous coordinate of a cell's lattice point.
    pub fn cell_coordinate(&self, cell: GridCell) -> LatLng {
        LatLng::new(
            cell.0 as f64 * self.step.lat + self.min.lat,
            cell.1 as f64 * self.step.lng + self.min.lng,
        )
    }

    /// Snap a coordinate onto the lattice: `index * step + min` per axis.
    pub fn snap(&self, p: LatLng) -> LatLng {
        self.cell_coordinate(self.cell(p))
    }

    /// L1 distance between two cells, in degrees.
    pub fn l1_distance(&self, a: GridCell, b: GridCell) -> f64 {
        (a.0 - b.0).unsigned_abs() as f64 * self.step.lat
            + (a.1 - b.1).unsigned_abs() as f64 * self.step.lng
    }

    /// Number of cells in the configured domain (both corners inclusive).
    pub fn cell_count(&self) -> usize {
        (self.steps[0] as usize + 1) * (self.steps[1] as usize + 1)
    }

    /// True if the cell lies inside the configured domain.
    pub fn contains(&self, cell: GridCell) -> bool {
        (0..=self.steps[0] as i64).contains(&cell.0) && (0..=self.steps[1] as i64).contains(&cell.1)
    }

    /// Every domain cell, latitude-major, in ascending index order.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        let lng_steps = self.steps[1] as i64;
        (0..=self.steps[0] as i64).flat_map(move |i| (0..=lng_steps).map(move |j| GridCell(i, j)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_grid() -> CoordinateGrid {
        CoordinateGrid::new(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0), [10, 10])
            .expect("valid grid")
    }

    #[test]
    fn step_size_is_extent_over_steps() {
        let grid =
            CoordinateGrid::new(LatLng::new(38.2, -85.6), LatLng::new(38.3, -85.5), [10, 20])
                .unwrap();
        let step = grid.step_size();
        assert!((step.lat - 0.01).abs() < 1e-12);
        assert!((step.lng - 0.005).abs() < 1e-12);
    }

    #[test]
    fn rounds_each_axis_to_nearest_index() {
        let grid = unit_grid();
        assert_eq!(grid.cell(LatLng::new(3.4, 7.6)), GridCell(3, 8));
        assert_eq!(grid.snap(LatLng::new(3.4, 7.6)), LatLng::new(3.0, 8.0));
    }

    #[test]
    fn adjacent_inputs_straddling_half_land_in_distinct_cells() {
        let grid = unit_grid();
        let a = grid.cell(LatLng::new(3.4, 7.6));
        let b = grid.cell(LatLng::new(2.6, 7.4));
        assert_eq!(b, GridCell(3, 7));
        assert_ne!(a, b);
    }

    #[test]
    fn snap_is_idempotent() {
        let grid =
            CoordinateGrid::new(LatLng::new(38.2, -85.6), LatLng::new(38.3, -85.5), [10, 10])
                .unwrap();
        for &(lat, lng) in &[
            (38.2137, -85.5551),
            (38.2999, -85.6),
            (38.25, -85.55),
            (37.9, -86.1),
            (38.71, -85.01),
        ] {
            let once = grid.snap(LatLng::new(lat, lng));
            let twice = grid.snap(once);
            assert_eq!(once, twice, "snap not idempotent for ({lat}, {lng})");
            assert_eq!(grid.cell(once), grid.cell(LatLng::new(lat, lng)));
        }
    }

    #[test]
    fn out_of_range_coordinates_are_not_clamped() {
        let grid = unit_grid();
        assert_eq!(grid.cell(LatLng::new(-2.2, 14.9)), GridCell(-2, 15));
        assert!(!grid.contains(GridCell(-2, 15)));
        assert!(grid.contains(GridCell(10, 0)));
    }

    #[test]
    fn l1_distance_sums_axis_steps() {
        let grid =
            CoordinateGrid::new(LatLng::new(0.0, 0.0), LatLng::new(2.0, 1.0), [2, 4]).unwrap();
        assert_eq!(grid.l1_distance(GridCell(0, 0), GridCell(2, 4)), 2.0 + 1.0);
        assert_eq!(grid.l1_distance(GridCell(1, 1), GridCell(1, 1)), 0.0);
    }

    #[test]
    fn cells_cover_domain_inclusive() {
        let grid =
            CoordinateGrid::new(LatLng::new(0.0, 0.0), LatLng::new(2.0, 3.0), [2, 3]).unwrap();
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(cells.len(), grid.cell_count());
        assert_eq!(cells.len(), 12);
        assert_eq!(cells.first(), Some(&GridCell(0, 0)));
        assert_eq!(cells.last(), Some(&GridCell(2, 3)));
    }

    #[test]
    fn rejects_invalid_bounds_and_steps() {
        let min = LatLng::new(0.0, 0.0);
        assert!(CoordinateGrid::new(min, LatLng::new(0.0, 1.0), [1, 1]).is_err());
        assert!(CoordinateGrid::new(min, LatLng::new(1.0, 1.0), [0, 1]).is_err());
        assert!(CoordinateGrid::new(min, LatLng::new(f64::NAN, 1.0), [1, 1]).is_err());
    }
}
