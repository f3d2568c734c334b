//! Shared behaviour of visualisation styles.
//!
//! [`StyleBase`] resolves which fields a visualisation shows and under which
//! labels, groups source records for multi-chart rendering and describes the
//! configuration form every style offers. Concrete styles build on top of it.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value as JsonValue;
use vizkit_plugin_protocol::{
    ConfigForm, FormElement, Record, VisualizationSource, RECORD_ID_FIELD,
};

use crate::configs::style::{AxisGrouping, StyleConfig};
use crate::download::{dataset_download_uri, Entity};

/// Group that receives every record when no split applies.
pub const DEFAULT_GROUP: &str = "all";

/// Field and label resolution for one configured visualisation.
pub struct StyleBase<'a> {
    config: &'a StyleConfig,
    source: &'a dyn VisualizationSource,
}

impl<'a> StyleBase<'a> {
    pub fn new(config: &'a StyleConfig, source: &'a dyn VisualizationSource) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &StyleConfig {
        self.config
    }

    /// Selected field identifiers without empty or `"0"` entries, in configured order.
    pub fn fields(&self) -> IndexSet<String> {
        self.config
            .fields
            .iter()
            .map(|field| field.trim())
            .filter(|field| !is_falsy(field))
            .map(str::to_string)
            .collect()
    }

    /// Every field the source reports, except the record id.
    pub async fn field_labels_original(&self) -> Vec<String> {
        self.source
            .get_fields()
            .await
            .into_keys()
            .filter(|field| field != RECORD_ID_FIELD)
            .collect()
    }

    /// Fields an editor can choose from, each labelled with its id.
    pub async fn source_field_options(&self) -> IndexMap<String, String> {
        self.field_labels_original()
            .await
            .into_iter()
            .map(|field| (field.clone(), field))
            .collect()
    }

    /// Effective `field -> label` mapping, in source order.
    ///
    /// Only selected fields the source actually has are included. Overrides
    /// relabel existing entries and never add new ones.
    pub async fn field_labels(&self) -> IndexMap<String, String> {
        let selected = self.fields();
        let mut labels: IndexMap<String, String> = self
            .source_field_options()
            .await
            .into_iter()
            .filter(|(field, _)| selected.contains(field))
            .collect();

        let overrides = self.config.labels.as_deref().unwrap_or_default();
        for (original, label) in parse_label_overrides(overrides) {
            if let Some(existing) = labels.get_mut(&original) {
                *existing = label;
            }
        }

        labels
    }

    /// Label of one field, or an empty string when it is not shown.
    pub async fn field_label(&self, field: &str) -> String {
        self.field_labels()
            .await
            .shift_remove(field)
            .unwrap_or_default()
    }

    /// Source records grouped by the split field.
    ///
    /// Records without a (non-null) split value, and all records when no
    /// split field is configured, go to [`DEFAULT_GROUP`].
    pub async fn source_records(&self) -> IndexMap<String, Vec<Record>> {
        let split_field = self
            .config
            .split_field
            .as_deref()
            .map(str::trim)
            .filter(|field| !field.is_empty());

        let mut groups: IndexMap<String, Vec<Record>> = IndexMap::new();
        for record in self.source.get_records().await.into_values() {
            let group = split_field
                .and_then(|field| record.get(field))
                .and_then(group_key)
                .unwrap_or_else(|| DEFAULT_GROUP.to_string());
            groups.entry(group).or_default().push(record);
        }

        groups
    }

    /// Values used in place of column labels on the x-axis.
    ///
    /// With `values` grouping and a values field configured this is that
    /// field's value in every record, in data order and with duplicates.
    /// Otherwise it is [`Self::field_labels_original`].
    pub async fn column_override_values(&self) -> Vec<String> {
        let axis = &self.config.x_axis;
        let values_field = axis
            .values_field
            .as_deref()
            .filter(|field| !field.is_empty());

        match (axis.grouping, values_field) {
            (AxisGrouping::Values, Some(field)) => {
                let records = self.source.get_records().await;
                records
                    .values()
                    .filter_map(|record| record.get(field))
                    .map(display_value)
                    .collect()
            }
            _ => self.field_labels_original().await,
        }
    }

    /// Override values configured for `column`, one per non-empty line.
    pub fn column_overrides(&self, column: &str) -> Vec<String> {
        self.config
            .column_overrides
            .get(column)
            .map(|text| {
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Download link for the dataset, see [`dataset_download_uri`].
    pub fn dataset_download_uri(&self, entity: &Entity, allowed_field_types: &[&str]) -> Option<String> {
        dataset_download_uri(entity, allowed_field_types)
    }

    /// Configuration form shared by all styles.
    pub async fn configuration_form(&self) -> ConfigForm {
        let options = self.source_field_options().await;
        let mut form = ConfigForm::new();

        form.push(
            FormElement::checkboxes("fields", "Fields", options.clone())
                .with_description("Fields to include in the visualisation.")
                .with_default(JsonValue::from(self.fields().into_iter().collect::<Vec<_>>())),
        );
        form.push(
            FormElement::text_area("labels", "Labels")
                .with_description("Override field labels, one original|new pair per line.")
                .with_default(self.config.labels.clone().unwrap_or_default()),
        );

        let mut split_options = IndexMap::from([(String::new(), "None".to_string())]);
        split_options.extend(options.clone());
        form.push(
            FormElement::select("splitField", "Split field", split_options.clone())
                .with_description("Render one chart per value of this field.")
                .with_default(self.config.split_field.clone().unwrap_or_default()),
        );

        let grouping_options = IndexMap::from([
            ("auto".to_string(), "One tick per column".to_string()),
            ("values".to_string(), "One tick per value of a field".to_string()),
        ]);
        let grouping = match self.config.x_axis.grouping {
            AxisGrouping::Auto => "auto",
            AxisGrouping::Values => "values",
        };
        form.push(
            FormElement::select("xAxis.grouping", "X-axis grouping", grouping_options)
                .with_default(grouping),
        );
        form.push(
            FormElement::select("xAxis.valuesField", "X-axis values field", split_options)
                .with_default(self.config.x_axis.values_field.clone().unwrap_or_default()),
        );

        for column in options.keys() {
            form.push(
                FormElement::text_area(format!("columnOverrides.{}", column), format!("{} overrides", column))
                    .with_description("One value per line.")
                    .with_default(self.config.column_overrides.get(column).cloned().unwrap_or_default()),
            );
        }

        form.push(
            FormElement::text_field("dataFilters.q", "Search query")
                .with_description("Only include rows matching this full-text query.")
                .with_default(self.config.data_filters.q.clone().unwrap_or_default()),
        );
        form.push(
            FormElement::text_area("dataFilters.filters", "Filters")
                .with_description(r#"JSON object of field values, e.g. {"state": "NY"} or {"year": ["2019", "2020"]}."#)
                .with_default(self.config.data_filters.filters.clone().unwrap_or_default()),
        );

        form
    }
}

/// Parse label override text into `(original, new)` pairs.
///
/// Lines that do not split into exactly two parts on `|` are skipped.
pub fn parse_label_overrides(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.trim().split('|').map(str::trim).collect();
            match parts.as_slice() {
                [original, label] => Some((original.to_string(), label.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// True when every cell below the header row is numeric.
pub fn columns_are_numeric(columns: &[Vec<JsonValue>]) -> bool {
    columns
        .iter()
        .skip(1)
        .flatten()
        .all(is_numeric)
}

fn is_numeric(value: &JsonValue) -> bool {
    match value {
        JsonValue::Number(_) => true,
        JsonValue::String(s) => is_numeric_str(s),
        _ => false,
    }
}

fn is_numeric_str(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && s.parse::<f64>().is_ok()
}

fn is_falsy(field: &str) -> bool {
    field.is_empty() || field == "0"
}

fn group_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        other => Some(display_value(other)),
    }
}

fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}
