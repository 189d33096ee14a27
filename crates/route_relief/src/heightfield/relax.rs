//! Iterative neighbour-averaging relaxation of a [`HeightField`].
//!
//! A pass walks the present cells in ascending `(ix, iy)` order and writes each new value
//! in place, so a cell later in the order already sees the values written earlier in the
//! same pass. The order comes from the field's storage, never from insertion history, so
//! identical fields always relax identically. Locked cells keep their value for the pass
//! and are unlocked as they are visited. Cells without any present neighbour keep their
//! value. After the walk, absent orthogonal neighbours of the cells present at the start
//! of the pass are created with the mean of their present neighbours.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::heightfield::{CellRect, HeightCell, HeightField};

const NEIGHBOURS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Relaxation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelaxOptions {
    /// A pass whose largest absolute change is below this converges.
    pub threshold: f64,
    /// Upper bound on the number of passes.
    pub max_passes: usize,
    /// Cells are only grown inside this rectangle, and a pass that still creates cells
    /// does not converge. `None` grows a ring per pass and judges convergence on the
    /// change alone.
    pub extent: Option<CellRect>,
}

impl Default for RelaxOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            max_passes: 10_000,
            extent: None,
        }
    }
}

impl RelaxOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    pub fn with_extent(mut self, extent: CellRect) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(Error::InvalidConfig(
                "relax threshold must be finite and > 0".into(),
            ));
        }
        if self.max_passes == 0 {
            return Err(Error::InvalidConfig("relax max_passes must be > 0".into()));
        }
        Ok(())
    }
}

/// Summary of a single pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PassReport {
    /// Largest absolute height change among cells present before the pass.
    pub max_change: f64,
    /// Cells created by the pass.
    pub created: usize,
    /// Present cells whose value was recomputed.
    pub updated: usize,
    /// Cells whose lock was released by the pass.
    pub unlocked: usize,
}

/// Result of relaxing until convergence or the pass cap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxOutcome {
    pub passes: usize,
    pub converged: bool,
    pub last: PassReport,
}

#[derive(Clone, Debug, Default)]
pub struct Relaxer {
    options: RelaxOptions,
}

impl Relaxer {
    pub fn new(options: RelaxOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RelaxOptions {
        &self.options
    }

    fn may_grow(&self, ix: i64, iy: i64) -> bool {
        self.options.extent.is_none_or(|r| r.contains(ix, iy))
    }

    fn neighbour_mean(field: &HeightField, ix: i64, iy: i64) -> Option<f64> {
        let (sum, count) = NEIGHBOURS
            .iter()
            .filter_map(|(dx, dy)| field.height(ix + dx, iy + dy))
            .fold((0.0, 0usize), |(s, n), h| (s + h, n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Whether `report` ends relaxation under these options.
    pub fn is_converged(&self, report: &PassReport) -> bool {
        let settled = report.max_change < self.options.threshold;
        match self.options.extent {
            Some(_) => settled && report.created == 0,
            None => settled,
        }
    }

    /// Run one pass.
    pub fn pass(&self, field: &mut HeightField) -> PassReport {
        let present: Vec<(i64, i64)> = field.iter().map(|(key, _)| key).collect();
        let mut report = PassReport::default();

        let mut frontier: BTreeSet<(i64, i64)> = BTreeSet::new();
        for &(ix, iy) in &present {
            for (dx, dy) in NEIGHBOURS {
                let (nx, ny) = (ix + dx, iy + dy);
                if !field.contains(nx, ny) && self.may_grow(nx, ny) {
                    frontier.insert((nx, ny));
                }
            }

            if field.unlock(ix, iy) {
                report.unlocked += 1;
                continue;
            }
            let Some(height) = field.height(ix, iy) else {
                continue;
            };
            if let Some(mean) = Self::neighbour_mean(field, ix, iy) {
                report.max_change = report.max_change.max((mean - height).abs());
                report.updated += 1;
                field.set_height(ix, iy, mean);
            }
        }

        let grown: Vec<((i64, i64), f64)> = frontier
            .into_iter()
            .filter_map(|(ix, iy)| Self::neighbour_mean(field, ix, iy).map(|m| ((ix, iy), m)))
            .collect();
        report.created = grown.len();
        for ((ix, iy), mean) in grown {
            field.insert(ix, iy, HeightCell::new(mean, None));
        }

        report
    }

    /// Repeat passes until one converges or the pass cap is reached. `on_pass` sees the
    /// one-based pass number and its report.
    pub fn relax_with(
        &self,
        field: &mut HeightField,
        mut on_pass: impl FnMut(usize, &PassReport),
    ) -> RelaxOutcome {
        let mut last = PassReport::default();
        for pass in 1..=self.options.max_passes {
            last = self.pass(field);
            on_pass(pass, &last);
            if self.is_converged(&last) {
                debug!("Relaxation converged after {} passes.", pass);
                return RelaxOutcome {
                    passes: pass,
                    converged: true,
                    last,
                };
            }
        }
        RelaxOutcome {
            passes: self.options.max_passes,
            converged: false,
            last,
        }
    }

    pub fn relax(&self, field: &mut HeightField) -> RelaxOutcome {
        self.relax_with(field, |_, _| {})
    }
}
