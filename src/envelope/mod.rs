//! Response envelope unwrapping
//!
//! A page of results arrives wrapped in one of two envelope shapes:
//!
//! - Legacy: `{"d": {"results": [...], "__next": "<url>"}}`
//! - Modern: `{"value": [...], "@odata.nextLink": "<url>"}` (a bare
//!   `odata.nextLink` key also occurs; `@odata.nextLink` wins when both
//!   are present)
//!
//! When the legacy marker key `d` is present, legacy extraction is used
//! exclusively and modern keys are ignored. A payload with neither
//! marker yields an empty page, which is not an error.

use crate::types::{ContinuationToken, Record};
use serde_json::Value;

/// One unwrapped page: the result records and an optional continuation
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Result records, in response order
    pub records: Vec<Record>,
    /// Continuation token; absence terminates the page sequence
    pub next: Option<ContinuationToken>,
}

impl Page {
    /// Whether more pages exist
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// Extract the record list and continuation token from a decoded body
pub fn unwrap(body: &Value) -> Page {
    if let Some(legacy) = body.get("d") {
        return Page {
            records: collect_records(legacy.get("results")),
            next: token_at(legacy, "__next"),
        };
    }

    let next = token_at(body, "@odata.nextLink").or_else(|| token_at(body, "odata.nextLink"));
    Page {
        records: collect_records(body.get("value")),
        next,
    }
}

/// Collect object rows from an optional results array. Non-object rows
/// are skipped: a record is an object by definition.
fn collect_records(results: Option<&Value>) -> Vec<Record> {
    match results.and_then(Value::as_array) {
        Some(rows) => rows
            .iter()
            .filter_map(|row| row.as_object().cloned())
            .collect(),
        None => Vec::new(),
    }
}

/// Read a non-empty string token at a key
fn token_at(value: &Value, key: &str) -> Option<ContinuationToken> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
