//! Record-to-table normalization
//!
//! Rules, in order:
//! - column names pass through the rename map;
//! - selected columns come first in select-list order, then any extra
//!   columns in first-seen order;
//! - absent fields become empty cells, never silently omitted;
//! - nested values are rendered as compact JSON strings;
//! - exact-duplicate rows are dropped, first occurrence wins.

use crate::types::Record;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A flat table ready for serialization
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Output column headers, renamed and ordered
    pub columns: Vec<String>,
    /// Data rows, one cell per column
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Normalize records into a table.
    ///
    /// `select_order` lists the originally requested field names in
    /// output order; `rename` maps raw field names to display names.
    pub fn from_records(
        records: &[Record],
        select_order: &[String],
        rename: &HashMap<String, String>,
    ) -> Self {
        // Raw field names present in the data, in first-seen order
        let mut present = Vec::new();
        let mut seen_fields = HashSet::new();
        for record in records {
            for field in record.keys() {
                if seen_fields.insert(field.clone()) {
                    present.push(field.clone());
                }
            }
        }

        // Selected columns first (select order), then extras
        let mut raw_columns: Vec<String> = select_order
            .iter()
            .filter(|field| seen_fields.contains(*field))
            .cloned()
            .collect();
        for field in &present {
            if !select_order.contains(field) {
                raw_columns.push(field.clone());
            }
        }

        let columns = raw_columns
            .iter()
            .map(|field| rename.get(field).unwrap_or(field).clone())
            .collect();

        let mut rows = Vec::new();
        let mut seen_rows = HashSet::new();
        for record in records {
            let row: Vec<String> = raw_columns
                .iter()
                .map(|field| record.get(field).map(render_cell).unwrap_or_default())
                .collect();
            if seen_rows.insert(row.clone()) {
                rows.push(row);
            }
        }

        Self { columns, rows }
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Render one cell. Nested values become compact JSON so rows stay
/// comparable for deduplication.
fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        nested @ (Value::Array(_) | Value::Object(_)) => {
            serde_json::to_string(nested).unwrap_or_default()
        }
    }
}
