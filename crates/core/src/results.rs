//! Result types for visualisation operations
//!
//! This module contains the result types returned by [`crate::VisualizationManager`],
//! providing a centralized location for output structures.

use indexmap::IndexMap;
use serde::Serialize;
use vizkit_plugin_protocol::Record;

/// A field as it will be shown in the visualisation
#[derive(Debug, Clone, Serialize)]
pub struct FieldLabelInfo {
    pub id: String,
    pub label: String,
    /// Whether every value of this column is numeric
    pub numeric: bool,
    /// Override values configured for this column
    pub overrides: Vec<String>,
}

/// Result of resolving field labels
#[derive(Debug, Serialize)]
pub struct LabelListResult {
    /// Selected fields with their effective labels, in source order
    pub labels: Vec<FieldLabelInfo>,
    /// Every field the source offers
    pub available: Vec<String>,
    /// Values for the x-axis ticks
    pub tick_values: Vec<String>,
}

/// Result of grouping records by the split field
#[derive(Debug, Serialize)]
pub struct RecordGroupsResult {
    pub split_field: Option<String>,
    pub groups: IndexMap<String, Vec<Record>>,
    pub record_count: usize,
}
