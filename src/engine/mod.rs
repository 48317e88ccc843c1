//! Extraction orchestration
//!
//! Drives one full run: partition discovery once, then one paginated
//! extraction per partition value, in discovered order, isolating
//! per-partition failures so one bad partition never aborts the run.

mod types;

pub use types::{CancelFlag, RunOutcome, RunStats};

use crate::config::ExtractorConfig;
use crate::discover::PartitionDiscoverer;
use crate::error::Result;
use crate::extract::PartitionExtractor;
use crate::http::{QueryClient, QueryClientConfig};
use crate::negotiate::FieldSet;
use std::time::Instant;
use tracing::{error, info, warn};

/// Orchestrates a full extraction run
pub struct ExtractEngine {
    client: QueryClient,
    config: ExtractorConfig,
    stats: RunStats,
    cancel: CancelFlag,
}

impl ExtractEngine {
    /// Create an engine for the given config
    pub fn new(config: ExtractorConfig) -> Self {
        let client = QueryClient::with_config(QueryClientConfig::from_extractor(&config));
        Self::with_client(config, client)
    }

    /// Create an engine with a pre-built client
    pub fn with_client(config: ExtractorConfig, client: QueryClient) -> Self {
        Self {
            client,
            config,
            stats: RunStats::new(),
            cancel: CancelFlag::new(),
        }
    }

    /// Statistics for the most recent run
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Shared cancellation flag; setting it stops the run before the
    /// next partition
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Execute one extraction run.
    ///
    /// Discovery failure is fatal for the whole run. Per-partition
    /// failures are logged with the partition value, the field set in
    /// use, and the error, then skipped. The field set is negotiated on
    /// the first page of the run and reused frozen for every later
    /// partition.
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let start = Instant::now();
        self.stats = RunStats::new();

        let discoverer = PartitionDiscoverer::new(&self.client, &self.config);
        let key = discoverer.resolve_partition_key().await?;
        let values = discoverer.list_partition_values(&key).await?;
        self.stats.partitions_discovered = values.len();

        if values.is_empty() {
            warn!("no partition values discovered, producing empty result");
            self.stats.set_duration(start.elapsed().as_millis() as u64);
            return Ok(RunOutcome::Empty);
        }

        let extractor = PartitionExtractor::new(&self.client, &self.config);
        let mut fields = FieldSet::new(self.config.select_fields.iter().cloned());
        let mut records = Vec::new();
        let total = values.len();

        for (index, value) in values.iter().enumerate() {
            if self.cancel.is_requested() {
                warn!(
                    completed = index,
                    total, "cancellation requested, stopping before next partition"
                );
                break;
            }

            info!(partition = %value, n = index + 1, total, "extracting partition");
            match extractor.extract_partition(&key, value, &mut fields).await {
                Ok(rows) => {
                    self.stats.add_extracted(rows.len());
                    records.extend(rows);
                }
                Err(e) => {
                    self.stats.add_failure();
                    error!(
                        partition = %value,
                        fields = %fields.select_clause(),
                        error = %e,
                        "partition failed, continuing with remaining partitions"
                    );
                }
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            partitions = self.stats.partitions_extracted,
            failed = self.stats.partitions_failed,
            records = self.stats.records_extracted,
            duration_ms = self.stats.duration_ms,
            "run complete"
        );

        if records.is_empty() {
            Ok(RunOutcome::Empty)
        } else {
            Ok(RunOutcome::Extracted { records })
        }
    }
}
