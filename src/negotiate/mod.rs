//! Field-set negotiation
//!
//! The remote service rejects `$select` lists naming fields it no longer
//! exposes, with a 404 whose body names the offending field after the
//! word "segment" (e.g. `Resource not found for the segment 'UCFOO'`).
//! Negotiation shrinks the requested field set one rejection at a time
//! until the service accepts the request or no fields remain.
//!
//! The matcher is deliberately narrow: this error format is the only
//! input ever seen, so it is not generalized into a broad error parser.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches the quoted field name following the word "segment"
static SEGMENT_REJECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)segment\s+'([^']+)'").expect("valid regex"));

/// Extract the rejected field from a failed response, if the failure is
/// a field rejection at all.
///
/// Only a 404 whose body matches the segment pattern qualifies; any
/// other status (or a 404 without the pattern) is an authentication or
/// server problem and must not be treated as negotiable.
pub fn rejected_field(status: u16, body: &str) -> Option<String> {
    if status != 404 {
        return None;
    }
    segment_name(body)
}

/// The quoted name following "segment" in an error body
fn segment_name(body: &str) -> Option<String> {
    SEGMENT_REJECTION
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// An ordered set of requested field names.
///
/// Mutable only via negotiation, and only before any page has succeeded
/// under it: the first successful page freezes the set for the rest of
/// the run. Removing a field after rows were fetched under a different
/// field set would silently corrupt column alignment.
#[derive(Debug, Clone)]
pub struct FieldSet {
    fields: Vec<String>,
    frozen: bool,
}

impl FieldSet {
    /// Create a field set, dropping duplicates while preserving order
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for field in fields {
            let field = field.into();
            if !seen.contains(&field) {
                seen.push(field);
            }
        }
        Self {
            fields: seen,
            frozen: false,
        }
    }

    /// The fields, in request order
    pub fn as_slice(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields remaining
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields remain
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether a field is currently requested
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Comma-joined `$select` clause
    pub fn select_clause(&self) -> String {
        self.fields.join(",")
    }

    /// Lock the set against further negotiation
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the set is locked
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Negotiate away the field named in a rejection message.
    ///
    /// Returns the removed field name on success. Signals
    /// `FieldNegotiationExhausted` when the message names no
    /// identifiable field, the named field is not present, or removing
    /// it would leave zero fields; the caller must treat that as fatal
    /// for the query context. Each success strictly shrinks the set, so
    /// repeated negotiation terminates within `len()` iterations.
    pub fn drop_rejected(&mut self, message: &str) -> Result<String> {
        debug_assert!(!self.frozen, "negotiation on a frozen field set");

        let Some(field) = segment_name(message) else {
            return Err(Error::negotiation_exhausted(
                "no rejected field identifiable in error body",
            ));
        };
        let Some(pos) = self.fields.iter().position(|f| *f == field) else {
            return Err(Error::negotiation_exhausted(format!(
                "rejected field '{field}' is not in the requested set"
            )));
        };
        if self.fields.len() == 1 {
            return Err(Error::negotiation_exhausted(format!(
                "removing '{field}' would leave no fields"
            )));
        }
        self.fields.remove(pos);
        Ok(field)
    }
}
