//! Engine types
//!
//! Run outcome, statistics, and the cancellation flag.

use crate::types::Record;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Outcome of an extraction run.
///
/// Zero records is a valid outcome (e.g. no partition had data) and is
/// signalled explicitly rather than treated as an error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// At least one record was extracted
    Extracted {
        /// All successful partitions' records, in partition order
        records: Vec<Record>,
    },
    /// The run completed but produced no records
    Empty,
}

impl RunOutcome {
    /// Whether the run produced no records
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The extracted records (empty slice for an empty outcome)
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Extracted { records } => records,
            Self::Empty => &[],
        }
    }

    /// Consume the outcome, yielding the records
    pub fn into_records(self) -> Vec<Record> {
        match self {
            Self::Extracted { records } => records,
            Self::Empty => Vec::new(),
        }
    }
}

/// Statistics from one extraction run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Partition values produced by discovery
    pub partitions_discovered: usize,
    /// Partitions extracted completely
    pub partitions_extracted: usize,
    /// Partitions that failed and were skipped
    pub partitions_failed: usize,
    /// Total records accumulated
    pub records_extracted: usize,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed partition and its row count
    pub fn add_extracted(&mut self, records: usize) {
        self.partitions_extracted += 1;
        self.records_extracted += records;
    }

    /// Record a failed partition
    pub fn add_failure(&mut self) {
        self.partitions_failed += 1;
    }

    /// Set run duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Cooperative cancellation flag shared with signal handlers.
///
/// Cancellation is honored between partitions only; an in-flight page
/// fetch is allowed to complete so a truncated page is never mistaken
/// for a failed partition.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    requested: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Create a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
