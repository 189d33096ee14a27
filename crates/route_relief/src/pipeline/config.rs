//! Run configuration shared by every pipeline stage.
use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::chain::ChainOptions;
use crate::directions::Waypoint;
use crate::error::{Error, Result};
use crate::grid::{CoordinateGrid, GridSpec, LatLng};
use crate::heightfield::{CellRect, RelaxOptions};

/// What to do when a query for a non-seed candidate fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run with the query error.
    #[default]
    FailFast,
    /// Exclude the candidate cell from further scans and keep sampling.
    SkipCandidate,
}

/// Configuration for one pipeline run. Built once and passed by reference.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Coordinate every query starts from. Its cell seeds the visited set.
    pub origin: LatLng,
    /// Address sent to the provider instead of the raw origin coordinate.
    pub origin_label: Option<String>,
    /// Sampled domain.
    pub grid: GridSpec,
    /// Acceptance threshold in degrees (L1). `None` uses the larger axis step.
    pub min_distance: Option<f64>,
    /// Ask the provider for alternative routes.
    pub alternatives: bool,
    /// Step filtering for chain building.
    pub chain: ChainOptions,
    /// Handling of failed non-seed queries.
    pub failure_policy: FailurePolicy,
    /// Cap on non-seed queries.
    pub max_queries: Option<usize>,
    /// Frame the chains are rescaled into before rasterization.
    pub target: Bounds,
    /// Raster cell size in target units.
    pub scale: f64,
    /// Relaxation parameters. Without an explicit extent the target frame is used.
    pub relax: RelaxOptions,
    /// Lock rasterized cells so the first relaxation pass only fills around them.
    pub pin_samples: bool,
}

impl RunConfig {
    /// Creates a configuration with defaults for everything but the origin and domain.
    pub fn new(origin: LatLng, grid: GridSpec) -> Self {
        Self {
            origin,
            origin_label: None,
            grid,
            min_distance: None,
            alternatives: false,
            chain: ChainOptions::default(),
            failure_policy: FailurePolicy::default(),
            max_queries: None,
            target: Bounds {
                min: DVec3::ZERO,
                max: DVec3::splat(100.0),
            },
            scale: 1.0,
            relax: RelaxOptions::default(),
            pin_samples: false,
        }
    }

    pub fn with_origin_label(mut self, label: impl Into<String>) -> Self {
        self.origin_label = Some(label.into());
        self
    }

    pub fn with_min_distance(mut self, min_distance: f64) -> Self {
        self.min_distance = Some(min_distance);
        self
    }

    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_chain_options(mut self, chain: ChainOptions) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = Some(max_queries);
        self
    }

    pub fn with_target(mut self, target: Bounds) -> Self {
        self.target = target;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_relax(mut self, relax: RelaxOptions) -> Self {
        self.relax = relax;
        self
    }

    pub fn with_pin_samples(mut self, pin_samples: bool) -> Self {
        self.pin_samples = pin_samples;
        self
    }

    /// Builds the coordinate grid for the configured domain.
    pub fn coordinate_grid(&self) -> Result<CoordinateGrid> {
        CoordinateGrid::from_spec(&self.grid)
    }

    /// Acceptance threshold actually used for `grid`.
    pub fn effective_min_distance(&self, grid: &CoordinateGrid) -> f64 {
        self.min_distance.unwrap_or_else(|| {
            let step = grid.step_size();
            step.lat.max(step.lng)
        })
    }

    /// Query origin as sent to the provider.
    pub fn origin_waypoint(&self) -> Waypoint {
        match &self.origin_label {
            Some(label) => Waypoint::Address(label.clone()),
            None => Waypoint::Coordinate(self.origin),
        }
    }

    /// Cells covered by the target frame at the configured scale.
    pub fn target_extent(&self) -> Result<CellRect> {
        let lo = (self.target.min / self.scale).round();
        let hi = (self.target.max / self.scale).round();
        CellRect::new(lo.x as i64, lo.y as i64, hi.x as i64, hi.y as i64)
    }

    /// Relaxation options with the extent defaulted to the target frame.
    pub fn relax_options(&self) -> Result<RelaxOptions> {
        let mut options = self.relax;
        if options.extent.is_none() {
            options.extent = Some(self.target_extent()?);
        }
        Ok(options)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.origin.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "origin ({}) must be finite",
                self.origin
            )));
        }
        self.coordinate_grid()?;
        if let Some(d) = self.min_distance {
            if !d.is_finite() || d < 0.0 {
                return Err(Error::InvalidConfig(
                    "min_distance must be finite and >= 0".into(),
                ));
            }
        }
        if self.chain.travel_modes.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one travel mode must be kept".into(),
            ));
        }
        Bounds::new(self.target.min, self.target.max)?;
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(Error::InvalidConfig("scale must be finite and > 0".into()));
        }
        self.relax.validate()?;

        Ok(())
    }
}
