//! Greedy farthest-point coverage over a [`CoordinateGrid`].
//!
//! The sampler tracks three cell sets:
//! - visited: cells touched by the origin and by every returned chain,
//! - ruled out: domain cells already within `min_distance` of a visited cell,
//! - skipped: candidates whose query failed under a skip policy.
//!
//! All three only grow. Each [`FarthestPointSampler::step`] scans the domain cells that
//! are neither ruled out nor skipped and proposes the one farthest (L1) from its nearest
//! visited cell.
use std::collections::HashSet;

use glam::DVec3;
use tracing::debug;

use crate::chain::Chain;
use crate::grid::{CoordinateGrid, GridCell, LatLng};

/// A proposed query destination.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Cell to query toward.
    pub cell: GridCell,
    /// L1 distance from the cell to its nearest visited cell.
    pub distance: f64,
}

/// Counters describing the sampler's sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoverageStats {
    pub visited: usize,
    pub ruled_out: usize,
    pub skipped: usize,
    pub domain: usize,
}

/// Farthest-point coverage state for one sampling run.
#[derive(Clone, Debug)]
pub struct FarthestPointSampler {
    grid: CoordinateGrid,
    min_distance: f64,
    visited: HashSet<GridCell>,
    ruled_out: HashSet<GridCell>,
    skipped: HashSet<GridCell>,
}

impl FarthestPointSampler {
    /// Create an empty sampler. Cells within `min_distance` (inclusive) of a visited cell
    /// are never proposed.
    pub fn new(grid: CoordinateGrid, min_distance: f64) -> Self {
        Self {
            grid,
            min_distance,
            visited: HashSet::new(),
            ruled_out: HashSet::new(),
            skipped: HashSet::new(),
        }
    }

    /// Create a sampler whose visited set holds the origin's cell.
    pub fn seeded(grid: CoordinateGrid, min_distance: f64, origin: LatLng) -> Self {
        let mut sampler = Self::new(grid, min_distance);
        sampler.visit(origin);
        sampler
    }

    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }

    pub fn visited(&self) -> &HashSet<GridCell> {
        &self.visited
    }

    pub fn ruled_out(&self) -> &HashSet<GridCell> {
        &self.ruled_out
    }

    pub fn skipped(&self) -> &HashSet<GridCell> {
        &self.skipped
    }

    pub fn stats(&self) -> CoverageStats {
        CoverageStats {
            visited: self.visited.len(),
            ruled_out: self.ruled_out.len(),
            skipped: self.skipped.len(),
            domain: self.grid.cell_count(),
        }
    }

    /// Mark the cell containing `p` as visited. Returns true if it was new.
    pub fn visit(&mut self, p: LatLng) -> bool {
        let cell = self.grid.cell(p);
        self.visited.insert(cell)
    }

    /// Mark a cell as visited. Returns true if it was new.
    pub fn visit_cell(&mut self, cell: GridCell) -> bool {
        self.visited.insert(cell)
    }

    /// Fold every point of a chain into the visited set. Chain points carry
    /// longitude in `x` and latitude in `y`.
    pub fn fold_chain(&mut self, chain: &Chain) -> usize {
        chain
            .points()
            .iter()
            .filter(|p| self.visit(point_lat_lng(**p)))
            .count()
    }

    /// Exclude a cell from future scans after its query failed.
    pub fn skip(&mut self, cell: GridCell) {
        self.skipped.insert(cell);
    }

    /// Scan the remaining domain for the cell farthest from the visited set.
    ///
    /// Cells at or below `min_distance` move into the ruled-out set and are never
    /// rescanned. Ties keep the first cell in latitude-major order. Returns `None` when
    /// no remaining cell exceeds `min_distance`.
    pub fn step(&mut self) -> Option<Candidate> {
        let grid = self.grid;
        let mut best: Option<Candidate> = None;
        let mut newly_ruled_out = 0usize;

        for cell in grid.cells() {
            if self.ruled_out.contains(&cell) || self.skipped.contains(&cell) {
                continue;
            }

            let distance = nearest_distance(&grid, &self.visited, cell);
            if distance <= self.min_distance {
                self.ruled_out.insert(cell);
                newly_ruled_out += 1;
                continue;
            }

            if best.is_none_or(|b| distance > b.distance) {
                best = Some(Candidate { cell, distance });
            }
        }

        debug!(
            "Coverage step: {} newly ruled out, {} ruled out total, best {:?}.",
            newly_ruled_out,
            self.ruled_out.len(),
            best
        );
        best
    }
}

fn nearest_distance(grid: &CoordinateGrid, visited: &HashSet<GridCell>, cell: GridCell) -> f64 {
    visited
        .iter()
        .map(|&v| grid.l1_distance(cell, v))
        .fold(f64::INFINITY, f64::min)
}

/// Interpret a chain point's planar components as a coordinate.
pub(crate) fn point_lat_lng(p: DVec3) -> LatLng {
    LatLng::new(p.y, p.x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_grid() -> CoordinateGrid {
        CoordinateGrid::new(LatLng::new(-1.0, -1.0), LatLng::new(1.0, 1.0), [2, 2]).unwrap()
    }

    #[test]
    fn first_step_prefers_distance_two_and_rules_out_neighbors() {
        let mut sampler = FarthestPointSampler::seeded(centered_grid(), 1.0, LatLng::new(0.0, 0.0));
        assert!(sampler.visited().contains(&GridCell(1, 1)));

        let candidate = sampler.step().expect("corner cells remain");
        assert_eq!(candidate.distance, 2.0);
        assert_eq!(candidate.cell, GridCell(0, 0));

        let expected: HashSet<GridCell> = [
            GridCell(0, 1),
            GridCell(1, 0),
            GridCell(1, 1),
            GridCell(1, 2),
            GridCell(2, 1),
        ]
        .into_iter()
        .collect();
        assert_eq!(sampler.ruled_out(), &expected);
    }

    #[test]
    fn empty_visited_set_proposes_first_domain_cell() {
        let mut sampler = FarthestPointSampler::new(centered_grid(), 1.0);
        let candidate = sampler.step().unwrap();
        assert_eq!(candidate.cell, GridCell(0, 0));
        assert!(candidate.distance.is_infinite());
        assert!(sampler.ruled_out().is_empty());
    }

    #[test]
    fn returns_none_once_domain_is_covered() {
        let grid = centered_grid();
        let mut sampler = FarthestPointSampler::new(grid, 1.0);
        for cell in [GridCell(0, 0), GridCell(0, 2), GridCell(2, 0), GridCell(2, 2)] {
            sampler.visit_cell(cell);
        }
        assert!(sampler.step().is_none());
        assert_eq!(sampler.ruled_out().len(), grid.cell_count());
    }

    #[test]
    fn skipped_cells_are_never_proposed() {
        let mut sampler = FarthestPointSampler::seeded(centered_grid(), 1.0, LatLng::new(0.0, 0.0));
        sampler.skip(GridCell(0, 0));
        let candidate = sampler.step().unwrap();
        assert_eq!(candidate.cell, GridCell(0, 2));
        assert!(!sampler.ruled_out().contains(&GridCell(0, 0)));
    }

    #[test]
    fn coordinates_in_same_cell_are_indistinguishable() {
        let grid =
            CoordinateGrid::new(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0), [10, 10]).unwrap();
        let mut a = FarthestPointSampler::seeded(grid, 1.0, LatLng::new(3.1, 4.2));
        let mut b = FarthestPointSampler::seeded(grid, 1.0, LatLng::new(2.9, 3.8));
        assert!(!b.visit(LatLng::new(3.0, 4.0)));
        assert_eq!(a.visited(), b.visited());
        assert_eq!(a.step(), b.step());
        assert_eq!(a.ruled_out(), b.ruled_out());
    }

    #[test]
    fn sets_grow_monotonically_and_loop_terminates_within_domain_size() {
        let grid =
            CoordinateGrid::new(LatLng::new(0.0, 0.0), LatLng::new(6.0, 9.0), [6, 9]).unwrap();
        let mut sampler = FarthestPointSampler::seeded(grid, 1.0, LatLng::new(3.0, 3.0));

        let mut iterations = 0;
        let mut last = sampler.stats();
        while let Some(candidate) = sampler.step() {
            iterations += 1;
            assert!(iterations <= grid.cell_count(), "sampler failed to terminate");
            assert!(candidate.distance > sampler.min_distance());
            assert!(sampler.visit_cell(candidate.cell));

            let now = sampler.stats();
            assert!(now.visited > last.visited);
            assert!(now.ruled_out >= last.ruled_out);
            last = now;
        }
        assert!(iterations > 0);
        assert_eq!(sampler.stats().ruled_out, grid.cell_count());
    }

    #[test]
    fn fold_chain_reads_lng_from_x_and_lat_from_y() {
        let grid =
            CoordinateGrid::new(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0), [10, 10]).unwrap();
        let mut sampler = FarthestPointSampler::new(grid, 1.0);
        let chain = Chain::new(vec![
            DVec3::new(8.0, 2.0, 0.0),
            DVec3::new(8.1, 2.1, 5.0),
            DVec3::new(9.0, 2.0, 10.0),
        ])
        .unwrap();
        assert_eq!(sampler.fold_chain(&chain), 2);
        assert!(sampler.visited().contains(&GridCell(2, 8)));
        assert!(sampler.visited().contains(&GridCell(2, 9)));
    }
}
