//! Axis-aligned bounds over chain points, affine rescaling between frames, and merging.
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::chain::Chain;
use crate::error::{Error, Result};

/// Per-axis `(min, max)` over `x`, `y` and `z`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec3,
    pub max: DVec3,
}

impl Bounds {
    /// Create bounds, requiring finite corners with `max >= min` on every axis.
    pub fn new(min: DVec3, max: DVec3) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "bounds {min}..{max} must be finite"
            )));
        }
        if max.cmplt(min).any() {
            return Err(Error::InvalidConfig(format!(
                "bounds max {max} is below min {min}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Componentwise min/max over every point of every chain.
    pub fn from_chains<'a, I>(chains: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Chain>,
    {
        Self::from_points(chains.into_iter().flat_map(|c| c.points().iter().copied()))
    }

    /// Componentwise min/max over points. Empty input is an error.
    pub fn from_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| Error::DegenerateInput("cannot bound an empty point set".into()))?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Ok(Self { min, max })
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: DVec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Smallest bounds covering both inputs.
    pub fn merge(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Map `p` from this frame into `target`, axis by axis.
    ///
    /// Fails if any axis of this frame has zero width.
    pub fn scale_to(&self, p: DVec3, target: &Bounds) -> Result<DVec3> {
        let extent = self.extent();
        if extent.cmpeq(DVec3::ZERO).any() {
            return Err(Error::DegenerateInput(format!(
                "source bounds {}..{} have a zero-width axis",
                self.min, self.max
            )));
        }
        if self == target {
            return Ok(p);
        }
        let unit = (p - self.min) / extent;
        Ok(unit * target.extent() + target.min)
    }

    /// Rescale every chain from this frame into `target`.
    pub fn scale_chains(&self, chains: &[Chain], target: &Bounds) -> Result<Vec<Chain>> {
        chains
            .iter()
            .map(|c| c.try_map(|p| self.scale_to(p, target)))
            .collect()
    }
}

/// Bounds over a set of chains.
pub fn compute_bounds(chains: &[Chain]) -> Result<Bounds> {
    Bounds::from_chains(chains)
}

/// Map `p` from `source` into `target`.
pub fn scale(p: DVec3, source: &Bounds, target: &Bounds) -> Result<DVec3> {
    source.scale_to(p, target)
}

/// Componentwise min-of-mins and max-of-maxes.
pub fn merge_bounds(a: &Bounds, b: &Bounds) -> Bounds {
    a.merge(b)
}
