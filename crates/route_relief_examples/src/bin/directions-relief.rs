//! Sample live driving directions around an origin and write the relaxed relief as JSON.
//!
//! Requires `GOOGLE_MAPS_API_KEY`. Responses are cached on disk, so repeated runs over the
//! same domain issue no network requests.
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use route_relief::prelude::*;
use route_relief_examples::{init_tracing, parse_waypoint, write_relief, GoogleMaps, ReliefExport};
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    FailFast,
    Skip,
}

#[derive(Parser, Debug)]
#[command(about = "Turn driving times around an origin into a relaxed height field")]
struct Args {
    /// Origin address or "lat,lng".
    #[arg(long)]
    origin: String,
    /// One corner of the sampled domain, address or "lat,lng".
    #[arg(long)]
    corner_a: String,
    /// Opposite corner of the sampled domain.
    #[arg(long)]
    corner_b: String,
    /// Grid cells per axis.
    #[arg(long, default_value_t = 10)]
    steps: u32,
    #[arg(long, default_value = "cache")]
    cache_dir: PathBuf,
    #[arg(long, value_enum, default_value_t = Policy::FailFast)]
    policy: Policy,
    /// Stop after this many destination queries.
    #[arg(long)]
    max_queries: Option<usize>,
    /// Raster cell size in target units.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
    #[arg(long)]
    alternatives: bool,
    #[arg(long, default_value = "relief.json")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut google = GoogleMaps::from_env()?;
    let origin_waypoint = parse_waypoint(&args.origin);
    let origin = resolve_waypoint(&mut google, &origin_waypoint)
        .with_context(|| format!("resolving origin '{}'", args.origin))?;
    let a = resolve_waypoint(&mut google, &parse_waypoint(&args.corner_a))
        .with_context(|| format!("resolving corner '{}'", args.corner_a))?;
    let b = resolve_waypoint(&mut google, &parse_waypoint(&args.corner_b))
        .with_context(|| format!("resolving corner '{}'", args.corner_b))?;

    let grid = GridSpec::new(
        LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
        LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        [args.steps, args.steps],
    );
    info!("Origin {} over domain {} .. {}.", origin, grid.min, grid.max);

    let mut config = RunConfig::new(origin, grid)
        .with_scale(args.scale)
        .with_alternatives(args.alternatives)
        .with_failure_policy(match args.policy {
            Policy::FailFast => FailurePolicy::FailFast,
            Policy::Skip => FailurePolicy::SkipCandidate,
        });
    if let Waypoint::Address(label) = origin_waypoint {
        config = config.with_origin_label(label);
    }
    if let Some(max) = args.max_queries {
        config = config.with_max_queries(max);
    }

    let provider = CachedDirections::new(google, &args.cache_dir)?;
    let mut runner = ReliefRunner::try_new(config.clone(), provider)?;
    let mut progress = FnSink::new(|event| {
        if let PipelineEvent::QueryIssued {
            index, destination, ..
        } = event
        {
            info!("Query {} to {}.", index, destination);
        }
    });
    let result = runner.run_with_events(&mut progress)?;

    let stats = runner.provider().stats();
    info!(
        "Cache: {} hits, {} misses, {} writes.",
        stats.hits, stats.misses, stats.writes
    );

    write_relief(&args.out, &ReliefExport::new(&config, &result)?)?;
    info!("Wrote {}.", args.out.display());
    Ok(())
}
