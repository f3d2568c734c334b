//! Core types for the vizkit plugin protocol.
//!
//! This module contains the data structures passed between sources, styles
//! and the host:
//! - [`Record`] - One dataset row
//! - [`Field`] - One dataset column
//! - [`DataFilters`] - Row filters forwarded to the remote API

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Name of the reserved row identifier column in datastore payloads.
pub const RECORD_ID_FIELD: &str = "_id";

/// One row of a remote dataset.
///
/// Field order follows the order the values were copied in. Presence of a
/// field must be checked explicitly with [`IndexMap::get`] or
/// [`IndexMap::contains_key`]; a missing field and a `null` value are
/// different things.
pub type Record = IndexMap<String, JsonValue>;

/// Describes one column of a dataset.
///
/// The datastore API returns `{"id": "...", "type": "..."}` objects; anything
/// besides `id` is kept verbatim in [`Field::info`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Column identifier as reported by the remote schema.
    pub id: String,

    /// Remaining schema attributes (`type`, `info`, ...).
    #[serde(flatten)]
    pub info: Map<String, JsonValue>,
}

impl Field {
    /// Create a field with no extra schema attributes.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            info: Map::new(),
        }
    }
}

/// Optional filters narrowing which remote rows are returned.
///
/// Built from the free-text query and the JSON filter expression an editor
/// typed into the style configuration. Both halves are optional and an
/// unusable value is dropped instead of reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFilters {
    /// Free-text query (`q`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// Structured `field -> value` or `field -> [values]` filter (`filters`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, JsonValue>>,
}

impl DataFilters {
    /// Build filters from raw configuration text.
    ///
    /// - `q` is trimmed and dropped when empty.
    /// - `filters` must be a non-empty JSON object; anything else (empty text,
    ///   invalid JSON, arrays, `{}`) is dropped. String values, and strings
    ///   inside value lists, are trimmed.
    ///
    /// ```rust
    /// use vizkit_plugin_protocol::DataFilters;
    ///
    /// let filters = DataFilters::from_config(Some(""), Some("{not json"));
    /// assert!(filters.is_empty());
    /// ```
    #[must_use]
    pub fn from_config(q: Option<&str>, filters: Option<&str>) -> Self {
        let q = q
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        let filters = filters
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| serde_json::from_str::<JsonValue>(raw).ok())
            .and_then(|value| match value {
                JsonValue::Object(map) if !map.is_empty() => Some(map),
                _ => None,
            })
            .map(|map| {
                map.into_iter()
                    .map(|(key, value)| (key, trim_filter_value(value)))
                    .collect()
            });

        Self { q, filters }
    }

    /// Returns true when neither a query nor structured filters are set.
    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.filters.is_none()
    }
}

fn trim_filter_value(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::String(s) => JsonValue::String(s.trim().to_string()),
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(trim_filter_value).collect())
        }
        other => other,
    }
}
