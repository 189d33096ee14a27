//! JSON export of a relaxed field for downstream model generation.
use std::fs;
use std::path::Path;

use anyhow::Context;
use route_relief::bounds::Bounds;
use route_relief::heightfield::DenseGrid;
use route_relief::pipeline::{RunConfig, RunResult};
use serde::Serialize;

/// Everything an exporter needs: the target frame, the cell size and the dense field.
#[derive(Debug, Serialize)]
pub struct ReliefExport {
    pub target: Bounds,
    pub scale: f64,
    pub queries: usize,
    pub chains: usize,
    pub converged: bool,
    pub field: DenseGrid,
}

impl ReliefExport {
    pub fn new(config: &RunConfig, result: &RunResult) -> anyhow::Result<Self> {
        let rect = config.target_extent()?;
        Ok(Self {
            target: config.target,
            scale: config.scale,
            queries: result.summary.queries,
            chains: result.summary.chains,
            converged: result.summary.converged,
            field: result.field.to_dense(rect, config.target.min.z),
        })
    }
}

/// Write the export as pretty JSON, creating parent directories.
pub fn write_relief(path: &Path, export: &ReliefExport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(export)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
