//! Paginated per-partition extraction
//!
//! Fetches every record for one partition value, negotiating the field
//! set on the first page if the service rejects fields, then following
//! server-driven continuation tokens until none remains. A partition
//! either contributes all its pages or none.

use crate::config::ExtractorConfig;
use crate::envelope;
use crate::error::{Error, Result};
use crate::http::QueryClient;
use crate::negotiate::{rejected_field, FieldSet};
use crate::types::Record;
use tracing::{debug, warn};

/// Build the partition filter expression.
///
/// Single quotes in the value are escaped by doubling, the only
/// escaping rule the protocol requires.
pub fn filter_expression(key: &str, value: &str) -> String {
    format!("{key} eq '{}'", value.replace('\'', "''"))
}

/// Extracts all pages for single partition values
pub struct PartitionExtractor<'a> {
    client: &'a QueryClient,
    config: &'a ExtractorConfig,
}

impl<'a> PartitionExtractor<'a> {
    /// Create an extractor over the given client and config
    pub fn new(client: &'a QueryClient, config: &'a ExtractorConfig) -> Self {
        Self { client, config }
    }

    /// Fetch all records for one partition value.
    ///
    /// Negotiation happens only while the first page is being attempted
    /// and only on an unfrozen field set; the first successful page
    /// freezes the set for the remainder of the run. Continuation
    /// tokens are followed verbatim with no additional query parameters.
    /// The client's pacer inserts the configured pause before every
    /// request, page-to-page included.
    ///
    /// Any non-field HTTP failure is fatal for this partition only and
    /// carries the status plus a truncated body for diagnostics.
    pub async fn extract_partition(
        &self,
        key: &str,
        value: &str,
        fields: &mut FieldSet,
    ) -> Result<Vec<Record>> {
        let url = self.config.entity_url(&self.config.query_entity);
        let filter = filter_expression(key, value);

        // First page: renegotiate until the service accepts the field
        // set or negotiation exhausts. Do not advance past page one
        // while negotiating.
        let first = loop {
            let params = self.first_page_params(&filter, fields);
            let raw = self.client.get(&url, &params).await?;

            if raw.is_success() {
                break raw;
            }

            if !fields.is_frozen() && rejected_field(raw.status, &raw.body).is_some() {
                let removed = fields.drop_rejected(&raw.body)?;
                warn!(
                    partition = %value,
                    field = %removed,
                    remaining = fields.len(),
                    "service rejected field, retrying first page"
                );
                continue;
            }

            return Err(Error::http_status(raw.status, raw.body_snippet()));
        };

        fields.freeze();

        let page = envelope::unwrap(first.decoded()?);
        let mut records = page.records;
        let mut next = page.next;
        let mut pages = 1u32;

        while let Some(token) = next {
            let raw = self.client.get(&token, &[]).await?;
            if !raw.is_success() {
                return Err(Error::http_status(raw.status, raw.body_snippet()));
            }

            let page = envelope::unwrap(raw.decoded()?);
            records.extend(page.records);
            next = page.next;
            pages += 1;
        }

        debug!(partition = %value, pages, rows = records.len(), "partition extracted");
        Ok(records)
    }

    /// Query parameters for the first page of a partition
    fn first_page_params(&self, filter: &str, fields: &FieldSet) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("$select", fields.select_clause()),
            ("$top", self.config.page_top.to_string()),
            ("$filter", filter.to_string()),
        ];
        if let Some(format) = &self.config.format {
            params.push(("$format", format.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests;
