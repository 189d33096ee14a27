//! Offline run against a synthetic road grid with a lake nobody can drive to.
use std::path::PathBuf;

use clap::Parser;
use route_relief::prelude::*;
use route_relief_examples::{init_tracing, write_relief, GridRoads, ReliefExport};

#[derive(Parser, Debug)]
#[command(about = "Relax a height field from a synthetic road network")]
struct Args {
    #[arg(long, default_value_t = 12)]
    steps: u32,
    #[arg(long, default_value_t = 2.0)]
    scale: f64,
    /// Write the dense field here instead of only printing a summary.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let home = LatLng::new(38.25, -85.55);
    let roads =
        GridRoads::new(home).with_lake(LatLng::new(38.27, -85.53), LatLng::new(38.3, -85.5));
    let config = RunConfig::new(
        home,
        GridSpec::new(
            LatLng::new(38.2, -85.6),
            LatLng::new(38.3, -85.5),
            [args.steps, args.steps],
        ),
    )
    .with_origin_label("home")
    .with_failure_policy(FailurePolicy::SkipCandidate)
    .with_scale(args.scale);

    let mut runner = ReliefRunner::try_new(config.clone(), roads)?;
    let mut events = VecSink::only([PipelineEventKind::QuerySkipped, PipelineEventKind::Warning]);
    let result = runner.run_with_events(&mut events)?;

    let s = result.summary;
    println!(
        "queries={} chains={} skipped={} rasterized={} cells={} passes={} converged={}",
        s.queries, s.chains, s.skipped, s.rasterized_cells, s.cells, s.relax_passes, s.converged
    );
    for event in events.as_slice() {
        if let PipelineEvent::QuerySkipped { cell, error, .. } = event {
            println!("skipped {:?}: {}", cell, error);
        }
    }
    if let Some((lo, hi)) = result.field.height_range() {
        println!("height range {:.2} .. {:.2}", lo, hi);
    }

    if let Some(path) = args.out {
        write_relief(&path, &ReliefExport::new(&config, &result)?)?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
