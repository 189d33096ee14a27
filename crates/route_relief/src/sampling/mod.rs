//! Destination sampling: decides which grid cell is worth querying next.
pub mod coverage;

pub use coverage::{Candidate, CoverageStats, FarthestPointSampler};
