//! High-level visualisation interface
//!
//! This module provides the [`VisualizationManager`] which ties one visualisation
//! definition to the source plugin serving its data. It is the entry point the
//! CLI (or any other host) uses to resolve labels, group records and describe
//! configuration forms.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use vizkit_core::VisualizationManager;
//! # use vizkit_plugin_protocol::VisualizationSource;
//!
//! # async fn example(source: Arc<dyn VisualizationSource>) -> vizkit_core::VizkitResult<()> {
//! let config = VisualizationManager::load_config(Path::new("rainfall.yml"))?;
//! let manager = VisualizationManager::new(config, source);
//!
//! let labels = manager.list_labels().await;
//! let groups = manager.group_records().await;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::debug;
use vizkit_plugin_protocol::{ConfigForm, VisualizationSource};

use crate::cache::FileCacheStore;
use crate::configs::visualization::{parse_visualization_config, Settings, VisualizationConfig};
use crate::results::{FieldLabelInfo, LabelListResult, RecordGroupsResult};
use crate::style::{columns_are_numeric, StyleBase};
use crate::types::{VizkitError, VizkitResult};

/// One visualisation bound to its data source
pub struct VisualizationManager {
    pub config: VisualizationConfig,
    source: Arc<dyn VisualizationSource>,
}

impl VisualizationManager {
    pub fn new(config: VisualizationConfig, source: Arc<dyn VisualizationSource>) -> Self {
        Self { config, source }
    }

    /// Read and validate a visualisation file
    pub fn load_config(path: &Path) -> VizkitResult<VisualizationConfig> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VizkitError::Config(format!(
                "Failed to read visualisation config {}: {}",
                path.display(),
                e
            ))
        })?;

        parse_visualization_config(&content).map_err(|e| {
            VizkitError::Config(format!(
                "Failed to parse visualisation config {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn source(&self) -> &dyn VisualizationSource {
        self.source.as_ref()
    }

    pub fn style(&self) -> StyleBase<'_> {
        StyleBase::new(&self.config.style, self.source.as_ref())
    }

    /// Resolve the fields shown by the visualisation
    pub async fn list_labels(&self) -> LabelListResult {
        let style = self.style();
        let field_labels = style.field_labels().await;
        let records = self.source.get_records().await;

        let labels = field_labels
            .into_iter()
            .map(|(id, label)| {
                let mut column = vec![vec![JsonValue::String(id.clone())]];
                column.extend(
                    records
                        .values()
                        .filter_map(|record| record.get(&id))
                        .map(|value| vec![value.clone()]),
                );
                let numeric = columns_are_numeric(&column);
                let overrides = style.column_overrides(&id);

                FieldLabelInfo {
                    id,
                    label,
                    numeric,
                    overrides,
                }
            })
            .collect();

        LabelListResult {
            labels,
            available: style.field_labels_original().await,
            tick_values: style.column_override_values().await,
        }
    }

    /// Group the source records by the configured split field
    pub async fn group_records(&self) -> RecordGroupsResult {
        let groups = self.style().source_records().await;
        let record_count = groups.values().map(Vec::len).sum();
        debug!(groups = groups.len(), record_count, "grouped source records");

        RecordGroupsResult {
            split_field: self.config.style.split_field.clone(),
            groups,
            record_count,
        }
    }

    /// Source settings followed by style settings
    pub async fn configuration_form(&self) -> ConfigForm {
        let mut form = self.source.configuration_form();
        form.extend(self.style().configuration_form().await);
        form
    }
}

/// Open the file cache configured in `settings`.
///
/// Relative cache directories resolve against `base_dir`; without one the
/// cache lives in `<base_dir>/.vizkit/cache`.
pub fn open_file_cache(settings: &Settings, base_dir: &Path) -> FileCacheStore {
    match &settings.cache_dir {
        Some(dir) if dir.is_absolute() => FileCacheStore::with_dir(dir.clone()),
        Some(dir) => FileCacheStore::with_dir(base_dir.join(dir)),
        None => FileCacheStore::new(base_dir),
    }
}
