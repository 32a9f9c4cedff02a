//! Phase observer — hooks for logging, profiling, and debugging.
//!
//! Observers receive notifications at phase boundaries without coupling to
//! phase logic. Use cases include timing phases, watching corpus statistics
//! shrink toward the budget, and emitting structured telemetry.

use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Phase names
// ---------------------------------------------------------------------------

pub const PHASE_PREPROCESS: &str = "preprocess";
pub const PHASE_IDENTIFY: &str = "identify";
pub const PHASE_MAP: &str = "map";
pub const PHASE_REDUCE: &str = "reduce";
pub const PHASE_PRESENT: &str = "present";

// ---------------------------------------------------------------------------
// Clocks and reports
// ---------------------------------------------------------------------------

/// Wall-clock timer for one phase.
pub struct PhaseClock {
    start: Instant,
}

impl PhaseClock {
    pub fn start() -> Self {
        PhaseClock {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Per-phase metrics delivered to observers. Every field except the elapsed
/// time is optional; each phase reports what it measured.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    elapsed: Duration,
    documents: Option<usize>,
    sentences: Option<usize>,
    words: Option<usize>,
    clusters: Option<usize>,
    budget: Option<usize>,
}

impl PhaseReport {
    pub fn new(elapsed: Duration) -> Self {
        PhaseReport {
            elapsed,
            documents: None,
            sentences: None,
            words: None,
            clusters: None,
            budget: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn documents(&self) -> Option<usize> {
        self.documents
    }

    pub fn sentences(&self) -> Option<usize> {
        self.sentences
    }

    pub fn words(&self) -> Option<usize> {
        self.words
    }

    pub fn clusters(&self) -> Option<usize> {
        self.clusters
    }

    pub fn budget(&self) -> Option<usize> {
        self.budget
    }
}

/// Builder for [`PhaseReport`] with optional metrics.
pub struct PhaseReportBuilder {
    report: PhaseReport,
}

impl PhaseReportBuilder {
    pub fn new(elapsed: Duration) -> Self {
        PhaseReportBuilder {
            report: PhaseReport::new(elapsed),
        }
    }

    pub fn documents(mut self, n: usize) -> Self {
        self.report.documents = Some(n);
        self
    }

    pub fn sentences(mut self, n: usize) -> Self {
        self.report.sentences = Some(n);
        self
    }

    pub fn words(mut self, n: usize) -> Self {
        self.report.words = Some(n);
        self
    }

    pub fn clusters(mut self, n: usize) -> Self {
        self.report.clusters = Some(n);
        self
    }

    pub fn budget(mut self, n: usize) -> Self {
        self.report.budget = Some(n);
        self
    }

    pub fn build(self) -> PhaseReport {
        self.report
    }
}

// ---------------------------------------------------------------------------
// Observer trait and stock implementations
// ---------------------------------------------------------------------------

/// Callbacks at phase boundaries. All methods default to no-ops, so
/// implementors opt into only the hooks they need.
pub trait PhaseObserver {
    fn on_phase_start(&mut self, _phase: &'static str) {}
    fn on_phase_end(&mut self, _phase: &'static str, _report: &PhaseReport) {}
}

/// Observer that ignores everything; zero overhead.
pub struct NoopObserver;

impl PhaseObserver for NoopObserver {}

/// Observer that records every phase report in execution order.
#[derive(Default)]
pub struct PhaseTimingObserver {
    reports: Vec<(&'static str, PhaseReport)>,
}

impl PhaseTimingObserver {
    pub fn new() -> Self {
        PhaseTimingObserver::default()
    }

    pub fn reports(&self) -> &[(&'static str, PhaseReport)] {
        &self.reports
    }
}

impl PhaseObserver for PhaseTimingObserver {
    fn on_phase_end(&mut self, phase: &'static str, report: &PhaseReport) {
        self.reports.push((phase, report.clone()));
    }
}
