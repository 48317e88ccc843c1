//! Partition discovery
//!
//! Resolves which field partitions the extraction (trying a fixed
//! candidate list in priority order) and enumerates its distinct
//! values. Each value then drives one independent extraction pass.

use crate::config::ExtractorConfig;
use crate::envelope;
use crate::error::{Error, Result};
use crate::http::QueryClient;
use crate::negotiate::rejected_field;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Discovers the partition key and its distinct values
pub struct PartitionDiscoverer<'a> {
    client: &'a QueryClient,
    config: &'a ExtractorConfig,
}

impl<'a> PartitionDiscoverer<'a> {
    /// Create a discoverer over the given client and config
    pub fn new(client: &'a QueryClient, config: &'a ExtractorConfig) -> Self {
        Self { client, config }
    }

    /// Resolve the partition-key field name.
    ///
    /// Probes each candidate with a minimal one-row query selecting only
    /// that field. The first candidate the service accepts wins. A
    /// rejection naming exactly the probed candidate skips to the next
    /// one; any other failure aborts immediately, since continuing would
    /// mask a systemic problem (auth, server error, bad entity).
    pub async fn resolve_partition_key(&self) -> Result<String> {
        let url = self.config.entity_url(self.config.discovery_entity());

        for candidate in &self.config.partition_key_candidates {
            let params = self.probe_params(candidate);
            let raw = self.client.get(&url, &params).await?;

            if raw.is_success() {
                info!(key = %candidate, "resolved partition key");
                return Ok(candidate.clone());
            }

            match rejected_field(raw.status, &raw.body) {
                Some(field) if field == *candidate => {
                    debug!(candidate = %candidate, "candidate not exposed, skipping");
                }
                _ => {
                    return Err(Error::http_status(raw.status, raw.body_snippet()));
                }
            }
        }

        Err(Error::NoPartitionKeyFound {
            candidates: self.config.partition_key_candidates.clone(),
        })
    }

    /// List the distinct values of the resolved partition key.
    ///
    /// One request with a large page-size ceiling; empty and null values
    /// are dropped, the rest deduplicated and returned in ascending
    /// lexical order so runs are reproducible.
    pub async fn list_partition_values(&self, key: &str) -> Result<Vec<String>> {
        let url = self.config.entity_url(self.config.discovery_entity());
        let mut params = vec![
            ("$select", key.to_string()),
            ("$top", self.config.discovery_top.to_string()),
        ];
        if let Some(format) = &self.config.format {
            params.push(("$format", format.clone()));
        }

        let raw = self.client.get(&url, &params).await?;
        if !raw.is_success() {
            return Err(Error::http_status(raw.status, raw.body_snippet()));
        }

        let page = envelope::unwrap(raw.decoded()?);
        let mut values = BTreeSet::new();
        for record in &page.records {
            match record.get(key) {
                Some(Value::String(s)) if !s.is_empty() => {
                    values.insert(s.clone());
                }
                Some(Value::Number(n)) => {
                    values.insert(n.to_string());
                }
                _ => {}
            }
        }

        info!(key = %key, count = values.len(), "discovered partition values");
        Ok(values.into_iter().collect())
    }

    /// Minimal probe parameters for a candidate key
    fn probe_params(&self, candidate: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("$select", candidate.to_string()),
            ("$top", "1".to_string()),
        ];
        if let Some(format) = &self.config.format {
            params.push(("$format", format.clone()));
        }
        params
    }
}
