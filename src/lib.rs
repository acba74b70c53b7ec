//! Group recurring errors in a plain-text log by a normalized signature and count them.
//!
//! Lines are classified against an entry pattern, stitched into error blocks (stack traces
//! included), stripped of timestamps and worker ids, and tallied in first-seen order.

use std::fmt;
use thiserror::Error;

pub mod accumulator;
pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod normalizer;
pub mod progress;
pub mod report;
pub mod source;

pub use accumulator::{BlockAccumulator, ErrorBlock};
pub use aggregator::{AggregationTable, Aggregator};
pub use classifier::LineClassifier;
pub use config::{AnalysisConfig, ContinuationPolicy, Patterns};
pub use engine::{analyze, AnalysisEngine, RunStats};
pub use normalizer::{Normalizer, Signature};
pub use progress::{BarProgress, LogProgress, ProgressCounter, ProgressObserver};
pub use report::{CsvReport, JsonReport, ReportFormat, ReportSink};

/// Which of the two configured patterns an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternRole {
    Entry,
    Normalization,
}

impl fmt::Display for PatternRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PatternRole::Entry => "entry",
            PatternRole::Normalization => "normalization",
        })
    }
}

/// Errors that end an analysis run. Neither kind is worth retrying.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {role} pattern `{pattern}`: {source}")]
    Configuration {
        role: PatternRole,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("failed to read log: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
