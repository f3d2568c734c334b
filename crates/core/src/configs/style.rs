use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vizkit_plugin_protocol::DataFilters;

/// Settings shared by every visualisation style.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StyleConfig {
    /// Selected field identifiers, in display order. Empty and `"0"` entries are ignored.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Label overrides, one `original|new` pair per line.
    pub labels: Option<String>,
    /// Field whose values partition records into separate charts.
    pub split_field: Option<String>,
    #[serde(default)]
    pub x_axis: AxisConfig,
    /// Newline separated override values per column.
    #[serde(default)]
    pub column_overrides: BTreeMap<String, String>,
    #[serde(default)]
    pub data_filters: DataFilterConfig,
}

/// How x-axis ticks are derived.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AxisConfig {
    #[serde(default)]
    pub grouping: AxisGrouping,
    /// Field supplying tick values when grouping by values.
    pub values_field: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AxisGrouping {
    /// One tick per column.
    #[default]
    Auto,
    /// One tick per value of [`AxisConfig::values_field`].
    Values,
}

/// Raw data filter text as typed by an editor.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataFilterConfig {
    /// Free-text query.
    pub q: Option<String>,
    /// JSON object of `field: value` or `field: [values]`.
    pub filters: Option<String>,
}

impl StyleConfig {
    /// Data filters to forward to the source.
    pub fn data_filters(&self) -> DataFilters {
        DataFilters::from_config(
            self.data_filters.q.as_deref(),
            self.data_filters.filters.as_deref(),
        )
    }
}
