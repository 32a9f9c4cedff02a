//! The five-phase summarization pipeline.

pub mod observer;
pub mod runner;

pub use observer::{
    NoopObserver, PhaseObserver, PhaseReport, PhaseReportBuilder, PhaseTimingObserver,
    PHASE_IDENTIFY, PHASE_MAP, PHASE_PREPROCESS, PHASE_PRESENT, PHASE_REDUCE,
};
pub use runner::Summarizer;
