#![forbid(unsafe_code)]
//! route_relief: travel-time relief fields from sampled driving routes.
//!
//! Modules:
//! - grid: quantization of coordinates into grid cells
//! - sampling: greedy farthest-point coverage deciding which destination to query next
//! - directions: provider traits, response model, polyline codec, on-disk cache
//! - chain: conversion of responses into travel-time point chains
//! - bounds: bounds computation, affine rescaling and merging
//! - heightfield: sparse height field, MIN-reduction rasterization, relaxation
//! - pipeline: run configuration, events and the stage runner
//!
//! For a runnable walkthrough, see the `route_relief_examples` crate.
pub mod bounds;
pub mod chain;
pub mod directions;
pub mod error;
pub mod grid;
pub mod heightfield;
pub mod pipeline;
pub mod sampling;

/// Convenient re-exports for common types. Import with `use route_relief::prelude::*;`.
pub mod prelude {
    pub use crate::bounds::{compute_bounds, merge_bounds, scale, Bounds};
    pub use crate::chain::{Chain, ChainBuilder, ChainOptions};
    pub use crate::directions::{
        cache_key, resolve_waypoint, CachedDirections, DirectionsProvider, DirectionsRequest,
        DirectionsResponse, Geocoder, GeocodeResponse, Waypoint,
    };
    pub use crate::error::{Error, Result};
    pub use crate::grid::{CoordinateGrid, GridCell, GridSpec, LatLng};
    pub use crate::heightfield::{
        rasterize, rasterize_chains, CellRect, DenseGrid, HeightCell, HeightField, PassReport,
        RelaxOptions, RelaxOutcome, Relaxer, WriterId,
    };
    pub use crate::pipeline::{
        build_height_field, normalize_chains, normalize_datasets, relax_to_convergence, run,
        run_with_events, sample_chains, AsEventSink, EventSink, FailurePolicy, FnSink,
        MultiSink, Normalized, PipelineEvent, PipelineEventKind, ReliefRunner, RunConfig,
        RunResult, RunSummary, SamplingResult, VecSink,
    };
    pub use crate::sampling::{Candidate, CoverageStats, FarthestPointSampler};
}
