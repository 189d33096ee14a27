//! Event types and sinks for observing pipeline runs.
//!
//! This module defines [`PipelineEvent`] and a set of sinks and adapters to emit,
//! collect, or forward events while executing [`crate::pipeline::runner::run`] or one of
//! its individual stages.
use crate::bounds::Bounds;
use crate::grid::{GridCell, LatLng};
use crate::heightfield::{PassReport, RelaxOutcome};
use crate::pipeline::config::RunConfig;
use crate::pipeline::runner::RunSummary;
use crate::sampling::{Candidate, CoverageStats};

/// Describes events emitted by pipeline stages.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Emitted when a full run starts.
    RunStarted {
        /// The run configuration used.
        config: RunConfig,
    },

    /// Emitted when the full run finishes.
    RunFinished {
        /// Aggregated counters for the run.
        summary: RunSummary,
    },

    /// Emitted before each directions query. The seed query has index 0 and no candidate.
    QueryIssued {
        /// Zero-based query index.
        index: usize,
        /// Candidate that produced the destination, if any.
        candidate: Option<Candidate>,
        /// Queried destination.
        destination: LatLng,
    },

    /// Emitted after a query produced chains.
    QueryCompleted {
        /// Zero-based query index.
        index: usize,
        /// Chains built from the response.
        chains: usize,
        /// Cells that joined the visited set.
        newly_visited: usize,
    },

    /// Emitted when a failed query was skipped under
    /// [`crate::pipeline::FailurePolicy::SkipCandidate`].
    QuerySkipped {
        /// Zero-based query index.
        index: usize,
        /// Excluded cell.
        cell: GridCell,
        /// Rendered query error.
        error: String,
    },

    /// Emitted when the coverage loop stops.
    SamplingFinished {
        /// Queries issued, seed included.
        queries: usize,
        /// Chains accumulated.
        chains: usize,
        /// Final sampler counters.
        stats: CoverageStats,
    },

    /// Emitted after chains were rescaled into the target frame.
    ChainsNormalized {
        /// Bounds of the chains before rescaling.
        source: Bounds,
        /// Frame they were rescaled into.
        target: Bounds,
    },

    /// Emitted after the chains were rasterized.
    FieldRasterized {
        /// Populated cells.
        cells: usize,
    },

    /// Emitted after every relaxation pass.
    RelaxPass {
        /// One-based pass number.
        pass: usize,
        /// Pass summary.
        report: PassReport,
    },

    /// Emitted when relaxation stops.
    RelaxFinished {
        /// Convergence outcome.
        outcome: RelaxOutcome,
    },

    /// Non-fatal warning generated during a run.
    Warning {
        /// Context string (e.g. query index, stage name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`PipelineEvent`], used to filter what a sink receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineEventKind {
    RunStarted,
    RunFinished,
    QueryIssued,
    QueryCompleted,
    QuerySkipped,
    SamplingFinished,
    ChainsNormalized,
    FieldRasterized,
    RelaxPass,
    RelaxFinished,
    Warning,
}

impl PipelineEvent {
    pub fn kind(&self) -> PipelineEventKind {
        match self {
            PipelineEvent::RunStarted { .. } => PipelineEventKind::RunStarted,
            PipelineEvent::RunFinished { .. } => PipelineEventKind::RunFinished,
            PipelineEvent::QueryIssued { .. } => PipelineEventKind::QueryIssued,
            PipelineEvent::QueryCompleted { .. } => PipelineEventKind::QueryCompleted,
            PipelineEvent::QuerySkipped { .. } => PipelineEventKind::QuerySkipped,
            PipelineEvent::SamplingFinished { .. } => PipelineEventKind::SamplingFinished,
            PipelineEvent::ChainsNormalized { .. } => PipelineEventKind::ChainsNormalized,
            PipelineEvent::FieldRasterized { .. } => PipelineEventKind::FieldRasterized,
            PipelineEvent::RelaxPass { .. } => PipelineEventKind::RelaxPass,
            PipelineEvent::RelaxFinished { .. } => PipelineEventKind::RelaxFinished,
            PipelineEvent::Warning { .. } => PipelineEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`PipelineEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PipelineEvent);

    /// Whether events of `kind` should be built and sent at all.
    #[inline]
    fn wants(&self, _kind: PipelineEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PipelineEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PipelineEvent) {}

    #[inline]
    fn wants(&self, _kind: PipelineEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PipelineEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PipelineEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PipelineEvent),
{
    #[inline]
    fn send(&mut self, event: PipelineEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only of some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PipelineEvent>,
    only: Option<Vec<PipelineEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collect only events of the listed kinds.
    pub fn only(kinds: impl IntoIterator<Item = PipelineEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<PipelineEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PipelineEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: PipelineEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PipelineEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PipelineEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn into_inner(self) -> Vec<S> {
        self.sinks
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: PipelineEvent) {
        let kind = event.kind();
        let targets: Vec<usize> = (0..self.sinks.len())
            .filter(|&i| self.sinks[i].wants(kind))
            .collect();
        let Some((&last, rest)) = targets.split_last() else {
            return;
        };
        for &i in rest {
            self.sinks[i].send(event.clone());
        }
        self.sinks[last].send(event);
    }

    fn wants(&self, kind: PipelineEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}

/// Minimal adapter trait for types that can expose an [`EventSink`].
pub trait AsEventSink {
    fn as_event_sink(&mut self) -> &mut dyn EventSink;
}

impl AsEventSink for VecSink {
    fn as_event_sink(&mut self) -> &mut dyn EventSink {
        self
    }
}
