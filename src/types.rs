//! Common types used throughout odata-harvest

use serde_json::Value;

/// JSON value type (re-exported from serde_json)
pub type JsonValue = Value;

/// One result row: an ordered mapping from field name to value.
///
/// `serde_json` is built with `preserve_order`, so the map keeps the
/// field order the service returned. Absent fields stay absent here;
/// the output layer is responsible for representing them explicitly.
pub type Record = serde_json::Map<String, Value>;

/// Opaque continuation pointer to the next page of a result set.
///
/// Either an absolute URL or a skip-token URL; the server-supplied value
/// is followed verbatim with no additional query parameters.
pub type ContinuationToken = String;
