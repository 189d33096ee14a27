//! Control flow of a run: configuration, events and the stage runner.
pub mod config;
pub mod events;
pub mod runner;

pub use config::{FailurePolicy, RunConfig};
pub use events::{
    AsEventSink, EventSink, FnSink, MultiSink, PipelineEvent, PipelineEventKind, VecSink,
};
pub use runner::{
    build_height_field, normalize_chains, normalize_datasets, relax_to_convergence,
    relax_to_convergence_with_events, run, run_with_events, sample_chains,
    sample_chains_with_events, Normalized, ReliefRunner, RunResult, RunSummary, SamplingResult,
};
