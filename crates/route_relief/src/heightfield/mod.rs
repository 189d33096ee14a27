//! Sparse height field keyed by integer cell coordinates.
//!
//! Storage is a two-level ordered map (`ix` then `iy`), which gives every traversal a
//! stable row-by-row order. The field is first populated by MIN-reduction
//! ([`raster::rasterize`]) and afterwards mutated only by [`relax::Relaxer`].
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod raster;
pub mod relax;

pub use raster::{rasterize, rasterize_chain, rasterize_chains, MAX_SUBDIVISION_DEPTH};
pub use relax::{PassReport, RelaxOptions, RelaxOutcome, Relaxer};

/// Identifies the chain (or other source) that wrote a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WriterId(pub u32);

/// One populated cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightCell {
    pub height: f64,
    /// Rasterizing source of the value; `None` for cells grown by relaxation.
    pub writer: Option<WriterId>,
    /// Locked cells keep their height for the next relaxation pass, which unlocks them.
    pub locked: bool,
}

impl HeightCell {
    pub fn new(height: f64, writer: Option<WriterId>) -> Self {
        Self {
            height,
            writer,
            locked: false,
        }
    }
}

/// Inclusive rectangle of cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub min_x: i64,
    pub min_y: i64,
    pub max_x: i64,
    pub max_y: i64,
}

impl CellRect {
    pub fn new(min_x: i64, min_y: i64, max_x: i64, max_y: i64) -> Result<Self> {
        if max_x < min_x || max_y < min_y {
            return Err(Error::InvalidConfig(format!(
                "cell rect ({min_x},{min_y})..({max_x},{max_y}) is inverted"
            )));
        }
        Ok(Self {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    pub fn contains(&self, ix: i64, iy: i64) -> bool {
        (self.min_x..=self.max_x).contains(&ix) && (self.min_y..=self.max_y).contains(&iy)
    }

    pub fn width(&self) -> usize {
        (self.max_x - self.min_x + 1) as usize
    }

    pub fn height(&self) -> usize {
        (self.max_y - self.min_y + 1) as usize
    }
}

/// Row-major dense copy of a height field over a rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DenseGrid {
    pub rect: CellRect,
    /// `values[(iy - min_y) * width + (ix - min_x)]`.
    pub values: Vec<f64>,
}

impl DenseGrid {
    pub fn get(&self, ix: i64, iy: i64) -> Option<f64> {
        if !self.rect.contains(ix, iy) {
            return None;
        }
        let w = self.rect.width();
        let i = (iy - self.rect.min_y) as usize * w + (ix - self.rect.min_x) as usize;
        self.values.get(i).copied()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    columns: BTreeMap<i64, BTreeMap<i64, HeightCell>>,
    len: usize,
}

impl HeightField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, ix: i64, iy: i64) -> Option<&HeightCell> {
        self.columns.get(&ix).and_then(|col| col.get(&iy))
    }

    pub fn height(&self, ix: i64, iy: i64) -> Option<f64> {
        self.get(ix, iy).map(|c| c.height)
    }

    pub fn contains(&self, ix: i64, iy: i64) -> bool {
        self.get(ix, iy).is_some()
    }

    /// Insert or replace a cell.
    pub fn insert(&mut self, ix: i64, iy: i64, cell: HeightCell) -> Option<HeightCell> {
        let previous = self.columns.entry(ix).or_default().insert(iy, cell);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Overwrite the height of an existing cell, keeping its provenance.
    pub(crate) fn set_height(&mut self, ix: i64, iy: i64, height: f64) {
        if let Some(cell) = self.columns.get_mut(&ix).and_then(|col| col.get_mut(&iy)) {
            cell.height = height;
        }
    }

    /// Clear the lock of an existing cell, returning whether it was locked.
    pub(crate) fn unlock(&mut self, ix: i64, iy: i64) -> bool {
        self.columns
            .get_mut(&ix)
            .and_then(|col| col.get_mut(&iy))
            .is_some_and(|cell| std::mem::take(&mut cell.locked))
    }

    /// MIN-reduction write: keeps an existing smaller value, otherwise stores `height`
    /// and `writer`. Returns true if the cell changed.
    pub fn write_min(&mut self, ix: i64, iy: i64, height: f64, writer: WriterId) -> bool {
        let column = self.columns.entry(ix).or_default();
        match column.get_mut(&iy) {
            Some(cell) if cell.height < height => false,
            Some(cell) => {
                cell.height = height;
                cell.writer = Some(writer);
                true
            }
            None => {
                column.insert(iy, HeightCell::new(height, Some(writer)));
                self.len += 1;
                true
            }
        }
    }

    /// Lock every present cell for the next relaxation pass.
    pub fn lock_all(&mut self) {
        for cell in self.columns.values_mut().flat_map(|col| col.values_mut()) {
            cell.locked = true;
        }
    }

    pub fn unlock_all(&mut self) {
        for cell in self.columns.values_mut().flat_map(|col| col.values_mut()) {
            cell.locked = false;
        }
    }

    /// Cells in ascending `(ix, iy)` order.
    pub fn iter(&self) -> impl Iterator<Item = ((i64, i64), &HeightCell)> + '_ {
        self.columns
            .iter()
            .flat_map(|(&ix, col)| col.iter().map(move |(&iy, cell)| ((ix, iy), cell)))
    }

    /// Smallest rectangle covering every present cell.
    pub fn cell_rect(&self) -> Option<CellRect> {
        let min_x = *self.columns.keys().next()?;
        let max_x = *self.columns.keys().next_back()?;
        let (min_y, max_y) = self
            .columns
            .values()
            .filter_map(|col| Some((*col.keys().next()?, *col.keys().next_back()?)))
            .fold((i64::MAX, i64::MIN), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
        Some(CellRect {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    /// Minimum and maximum heights, if any cell is present.
    pub fn height_range(&self) -> Option<(f64, f64)> {
        self.iter()
            .map(|(_, c)| c.height)
            .fold(None, |acc: Option<(f64, f64)>, h| {
                Some(match acc {
                    None => (h, h),
                    Some((lo, hi)) => (lo.min(h), hi.max(h)),
                })
            })
    }

    /// Dense copy over `rect`, with `fill` for absent cells.
    pub fn to_dense(&self, rect: CellRect, fill: f64) -> DenseGrid {
        let mut values = Vec::with_capacity(rect.width() * rect.height());
        for iy in rect.min_y..=rect.max_y {
            for ix in rect.min_x..=rect.max_x {
                values.push(self.height(ix, iy).unwrap_or(fill));
            }
        }
        DenseGrid { rect, values }
    }
}
