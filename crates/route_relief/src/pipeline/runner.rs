//! High-level runner chaining coverage sampling, normalization, rasterization and relaxation.
use tracing::{debug, info, warn};

use crate::bounds::Bounds;
use crate::chain::{Chain, ChainBuilder};
use crate::directions::{DirectionsProvider, DirectionsRequest, DirectionsResponse, Waypoint};
use crate::error::{Error, Result};
use crate::grid::{GridCell, LatLng};
use crate::heightfield::{rasterize_chains, HeightField, RelaxOptions, RelaxOutcome, Relaxer};
use crate::pipeline::config::{FailurePolicy, RunConfig};
use crate::pipeline::events::{EventSink, PipelineEvent, PipelineEventKind};
use crate::sampling::{Candidate, CoverageStats, FarthestPointSampler};

/// Chains gathered by the coverage loop.
#[derive(Debug, Clone, Default)]
pub struct SamplingResult {
    /// Chains from every successful query, in query order.
    pub chains: Vec<Chain>,
    /// Queries issued, seed included.
    pub queries: usize,
    /// Candidates whose query failed and was skipped.
    pub skipped: Vec<GridCell>,
    /// Final sampler counters.
    pub stats: CoverageStats,
    /// True if sampling stopped at `max_queries` rather than on coverage.
    pub truncated: bool,
}

/// Chains rescaled into a target frame.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub chains: Vec<Chain>,
    /// Frame the chains were mapped from.
    pub source: Bounds,
    /// Frame the chains were mapped into.
    pub target: Bounds,
}

/// Counters for a full run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunSummary {
    pub queries: usize,
    pub chains: usize,
    pub skipped: usize,
    /// Cells written by rasterization.
    pub rasterized_cells: usize,
    /// Cells after relaxation.
    pub cells: usize,
    pub relax_passes: usize,
    pub converged: bool,
}

/// Result of a full run.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Chains in the target frame.
    pub chains: Vec<Chain>,
    /// Bounds of the raw chains.
    pub source_bounds: Bounds,
    /// Relaxed height field.
    pub field: HeightField,
    pub relax: RelaxOutcome,
    pub coverage: CoverageStats,
    pub summary: RunSummary,
}

/// Owns a configuration and a provider for repeated runs.
pub struct ReliefRunner<P> {
    /// Run configuration applied to this runner.
    pub config: RunConfig,
    provider: P,
}

impl<P: DirectionsProvider> ReliefRunner<P> {
    pub fn try_new(config: RunConfig, provider: P) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, provider })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_provider(self) -> P {
        self.provider
    }

    /// Runs the full pipeline, returning the result.
    pub fn run(&mut self) -> Result<RunResult> {
        run(&self.config, &mut self.provider, None)
    }

    pub fn run_with_events(&mut self, sink: &mut dyn EventSink) -> Result<RunResult> {
        run(&self.config, &mut self.provider, Some(sink))
    }
}

fn query<P: DirectionsProvider + ?Sized>(
    provider: &mut P,
    builder: &ChainBuilder,
    request: &DirectionsRequest,
) -> Result<Vec<Chain>> {
    let raw = provider.fetch(request)?;
    let response = DirectionsResponse::parse(&raw)?;
    response.ensure_ok()?;
    let chains = builder.build(&response)?;
    if chains.is_empty() {
        return Err(Error::NoRoute {
            destination: request.destination.to_string(),
        });
    }
    Ok(chains)
}

fn fold_chains(sampler: &mut FarthestPointSampler, chains: &[Chain]) -> usize {
    chains.iter().map(|c| sampler.fold_chain(c)).sum()
}

fn emit_issued(
    sink: &mut dyn EventSink,
    index: usize,
    candidate: Option<Candidate>,
    destination: LatLng,
) {
    if sink.wants(PipelineEventKind::QueryIssued) {
        sink.send(PipelineEvent::QueryIssued {
            index,
            candidate,
            destination,
        });
    }
}

fn emit_completed(sink: &mut dyn EventSink, index: usize, chains: usize, newly_visited: usize) {
    if sink.wants(PipelineEventKind::QueryCompleted) {
        sink.send(PipelineEvent::QueryCompleted {
            index,
            chains,
            newly_visited,
        });
    }
}

pub fn sample_chains<P: DirectionsProvider + ?Sized>(
    config: &RunConfig,
    provider: &mut P,
    sink: Option<&mut dyn EventSink>,
) -> Result<SamplingResult> {
    if let Some(s) = sink {
        sample_chains_with_events(config, provider, s)
    } else {
        sample_chains_with_events(config, provider, &mut ())
    }
}

/// Farthest-point coverage loop.
///
/// The seed query runs from the origin to the domain minimum; its failure is always
/// fatal. Every later query targets the candidate returned by
/// [`FarthestPointSampler::step`]. A successful route that does not reach its
/// candidate's cell excludes that cell from further scans, so no cell is queried twice.
pub fn sample_chains_with_events<P: DirectionsProvider + ?Sized>(
    config: &RunConfig,
    provider: &mut P,
    sink: &mut dyn EventSink,
) -> Result<SamplingResult> {
    config.validate()?;
    let grid = config.coordinate_grid()?;
    let min_distance = config.effective_min_distance(&grid);
    let builder = ChainBuilder::new(config.chain.clone());
    let origin: Waypoint = config.origin_waypoint();

    let mut sampler = FarthestPointSampler::seeded(grid, min_distance, config.origin);
    let mut result = SamplingResult::default();

    let seed_destination = grid.min();
    emit_issued(sink, 0, None, seed_destination);
    let request = DirectionsRequest::new(origin.clone(), seed_destination)
        .with_alternatives(config.alternatives);
    let chains = query(provider, &builder, &request).inspect_err(|e| {
        warn!("Seed query {} -> {} failed: {}.", origin, seed_destination, e);
    })?;
    result.queries = 1;
    let newly_visited = fold_chains(&mut sampler, &chains);
    emit_completed(sink, 0, chains.len(), newly_visited);
    result.chains.extend(chains);

    while let Some(candidate) = sampler.step() {
        if config.max_queries.is_some_and(|max| result.queries > max) {
            info!(
                "Stopping after {} queries (max_queries reached).",
                result.queries
            );
            result.truncated = true;
            break;
        }

        let index = result.queries;
        let destination = grid.cell_coordinate(candidate.cell);
        debug!(
            "Query {}: {:?} at distance {:.6} -> {}.",
            index, candidate.cell, candidate.distance, destination
        );
        emit_issued(sink, index, Some(candidate), destination);

        let request = DirectionsRequest::new(origin.clone(), destination)
            .with_alternatives(config.alternatives);
        result.queries += 1;

        match query(provider, &builder, &request) {
            Ok(chains) => {
                let newly_visited = fold_chains(&mut sampler, &chains);
                if !sampler.visited().contains(&candidate.cell) {
                    debug!(
                        "Route to {} did not reach {:?}; excluding the cell.",
                        destination, candidate.cell
                    );
                    sampler.skip(candidate.cell);
                }
                emit_completed(sink, index, chains.len(), newly_visited);
                result.chains.extend(chains);
            }
            Err(e)
                if e.is_query_failure()
                    && config.failure_policy == FailurePolicy::SkipCandidate =>
            {
                warn!(
                    "Query {} to {} failed; skipping {:?}: {}.",
                    index, destination, candidate.cell, e
                );
                sampler.skip(candidate.cell);
                result.skipped.push(candidate.cell);
                if sink.wants(PipelineEventKind::QuerySkipped) {
                    sink.send(PipelineEvent::QuerySkipped {
                        index,
                        cell: candidate.cell,
                        error: e.to_string(),
                    });
                }
            }
            Err(e) => {
                warn!("Query {} to {} failed: {}.", index, destination, e);
                return Err(e);
            }
        }
    }

    result.stats = sampler.stats();
    info!(
        "Sampling finished: {} queries, {} chains, {} of {} cells ruled out, {} skipped.",
        result.queries,
        result.chains.len(),
        result.stats.ruled_out,
        result.stats.domain,
        result.skipped.len()
    );
    if sink.wants(PipelineEventKind::SamplingFinished) {
        sink.send(PipelineEvent::SamplingFinished {
            queries: result.queries,
            chains: result.chains.len(),
            stats: result.stats,
        });
    }

    Ok(result)
}

/// Rescale chains from their own bounds into `target`.
pub fn normalize_chains(chains: &[Chain], target: &Bounds) -> Result<Normalized> {
    let source = Bounds::from_chains(chains)?;
    let scaled = source.scale_chains(chains, target)?;
    debug!(
        "Normalized {} chains from {}..{} into {}..{}.",
        chains.len(),
        source.min,
        source.max,
        target.min,
        target.max
    );
    Ok(Normalized {
        chains: scaled,
        source,
        target: *target,
    })
}

/// Rescale two independently sampled chain sets into one shared frame, derived from the
/// merge of their bounds.
pub fn normalize_datasets(
    a: &[Chain],
    b: &[Chain],
    target: &Bounds,
) -> Result<(Normalized, Normalized)> {
    let source = Bounds::from_chains(a)?.merge(&Bounds::from_chains(b)?);
    let scale = |chains: &[Chain]| -> Result<Normalized> {
        Ok(Normalized {
            chains: source.scale_chains(chains, target)?,
            source,
            target: *target,
        })
    };
    Ok((scale(a)?, scale(b)?))
}

/// Rasterize chains (writer id = chain index), optionally locking every written cell.
pub fn build_height_field(chains: &[Chain], scale: f64, pin_samples: bool) -> Result<HeightField> {
    let mut field = rasterize_chains(chains, scale)?;
    if pin_samples {
        field.lock_all();
    }
    debug!(
        "Rasterized {} chains into {} cells at scale {}.",
        chains.len(),
        field.len(),
        scale
    );
    Ok(field)
}

pub fn relax_to_convergence(
    field: &mut HeightField,
    options: &RelaxOptions,
    sink: Option<&mut dyn EventSink>,
) -> Result<RelaxOutcome> {
    if let Some(s) = sink {
        relax_to_convergence_with_events(field, options, s)
    } else {
        relax_to_convergence_with_events(field, options, &mut ())
    }
}

/// Relax `field` until a pass converges or the pass cap is reached. Hitting the cap is
/// reported as a warning, not an error.
pub fn relax_to_convergence_with_events(
    field: &mut HeightField,
    options: &RelaxOptions,
    sink: &mut dyn EventSink,
) -> Result<RelaxOutcome> {
    options.validate()?;
    let relaxer = Relaxer::new(*options);
    let outcome = relaxer.relax_with(field, |pass, report| {
        if sink.wants(PipelineEventKind::RelaxPass) {
            sink.send(PipelineEvent::RelaxPass {
                pass,
                report: *report,
            });
        }
    });

    if outcome.converged {
        info!(
            "Relaxation converged after {} passes ({} cells).",
            outcome.passes,
            field.len()
        );
    } else {
        warn!(
            "Relaxation stopped at the pass cap ({}) with max change {:.4}.",
            outcome.passes, outcome.last.max_change
        );
        if sink.wants(PipelineEventKind::Warning) {
            sink.send(PipelineEvent::Warning {
                context: "relax".into(),
                message: format!(
                    "not converged after {} passes (max change {})",
                    outcome.passes, outcome.last.max_change
                ),
            });
        }
    }
    if sink.wants(PipelineEventKind::RelaxFinished) {
        sink.send(PipelineEvent::RelaxFinished { outcome });
    }

    Ok(outcome)
}

pub fn run<P: DirectionsProvider + ?Sized>(
    config: &RunConfig,
    provider: &mut P,
    sink: Option<&mut dyn EventSink>,
) -> Result<RunResult> {
    if let Some(s) = sink {
        run_with_events(config, provider, s)
    } else {
        run_with_events(config, provider, &mut ())
    }
}

/// Full pipeline: sample, normalize into `config.target`, rasterize, relax.
pub fn run_with_events<P: DirectionsProvider + ?Sized>(
    config: &RunConfig,
    provider: &mut P,
    sink: &mut dyn EventSink,
) -> Result<RunResult> {
    config.validate()?;
    if sink.wants(PipelineEventKind::RunStarted) {
        sink.send(PipelineEvent::RunStarted {
            config: config.clone(),
        });
    }

    let sampling = sample_chains_with_events(config, provider, sink)?;

    let normalized = normalize_chains(&sampling.chains, &config.target)?;
    if sink.wants(PipelineEventKind::ChainsNormalized) {
        sink.send(PipelineEvent::ChainsNormalized {
            source: normalized.source,
            target: normalized.target,
        });
    }

    let mut field = build_height_field(&normalized.chains, config.scale, config.pin_samples)?;
    let rasterized_cells = field.len();
    info!(
        "Rasterized {} chains into {} cells.",
        normalized.chains.len(),
        rasterized_cells
    );
    if sink.wants(PipelineEventKind::FieldRasterized) {
        sink.send(PipelineEvent::FieldRasterized {
            cells: rasterized_cells,
        });
    }

    let relax = relax_to_convergence_with_events(&mut field, &config.relax_options()?, sink)?;

    let summary = RunSummary {
        queries: sampling.queries,
        chains: normalized.chains.len(),
        skipped: sampling.skipped.len(),
        rasterized_cells,
        cells: field.len(),
        relax_passes: relax.passes,
        converged: relax.converged,
    };
    info!(
        "Run finished: {} queries, {} chains, {} cells.",
        summary.queries, summary.chains, summary.cells
    );
    if sink.wants(PipelineEventKind::RunFinished) {
        sink.send(PipelineEvent::RunFinished { summary });
    }

    Ok(RunResult {
        chains: normalized.chains,
        source_bounds: normalized.source,
        field,
        relax,
        coverage: sampling.stats,
        summary,
    })
}
