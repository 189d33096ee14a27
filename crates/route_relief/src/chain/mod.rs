//! Point chains built from route legs.
//!
//! A [`Chain`] is an ordered, immutable run of 3D points: planar `x` (longitude or a
//! rescaled equivalent), planar `y` (latitude or equivalent) and `z` (elapsed duration).
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod builder;

pub use builder::{ChainBuilder, ChainOptions};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    points: Vec<DVec3>,
}

impl Chain {
    /// Create a chain from finite points. Empty input is rejected.
    pub fn new(points: Vec<DVec3>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::DegenerateInput("chain has no points".into()));
        }
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(Error::DegenerateInput(format!(
                "chain point {p} is not finite"
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> DVec3 {
        self.points[0]
    }

    pub fn last(&self) -> DVec3 {
        self.points[self.points.len() - 1]
    }

    /// Consecutive point pairs.
    pub fn segments(&self) -> impl Iterator<Item = (DVec3, DVec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    /// Apply a fallible point transform, producing a new chain.
    pub fn try_map(&self, mut f: impl FnMut(DVec3) -> Result<DVec3>) -> Result<Chain> {
        let points = self
            .points
            .iter()
            .map(|&p| f(p))
            .collect::<Result<Vec<_>>>()?;
        Chain::new(points)
    }

    pub fn into_points(self) -> Vec<DVec3> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_non_finite_points() {
        assert!(Chain::new(Vec::new()).is_err());
        assert!(Chain::new(vec![DVec3::new(0.0, f64::NAN, 0.0)]).is_err());
        assert!(Chain::new(vec![DVec3::new(0.0, 0.0, f64::INFINITY)]).is_err());
    }

    #[test]
    fn segments_pair_consecutive_points() {
        let chain = Chain::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y]).unwrap();
        let segments: Vec<_> = chain.segments().collect();
        assert_eq!(segments, vec![(DVec3::ZERO, DVec3::X), (DVec3::X, DVec3::Y)]);
        assert_eq!(chain.first(), DVec3::ZERO);
        assert_eq!(chain.last(), DVec3::Y);
    }

    #[test]
    fn try_map_propagates_errors() {
        let chain = Chain::new(vec![DVec3::ZERO, DVec3::ONE]).unwrap();
        let doubled = chain.try_map(|p| Ok(p * 2.0)).unwrap();
        assert_eq!(doubled.points(), &[DVec3::ZERO, DVec3::splat(2.0)]);
        assert!(chain.try_map(|_| Err(Error::Other("nope".into()))).is_err());
    }
}
