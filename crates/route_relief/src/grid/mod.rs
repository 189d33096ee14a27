//! Coordinate quantization shared by the sampler and chain folding.
pub mod coordinate;

pub use coordinate::{CoordinateGrid, GridCell, GridSpec, LatLng};
