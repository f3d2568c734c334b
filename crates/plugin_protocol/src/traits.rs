//! Core trait for implementing vizkit source plugins.
//!
//! [`VisualizationSource`] is the "get records" contract style plugins rely
//! on. A style never knows which remote system sits behind it.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::form::ConfigForm;
use crate::types::Record;

/// A plugin that provides the field schema and rows of a tabular dataset.
///
/// **Failure contract**: implementations must not surface fetch failures
/// through this trait. A remote source that cannot be reached renders as an
/// empty dataset; log the failure instead.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use indexmap::IndexMap;
/// use vizkit_plugin_protocol::{Record, VisualizationSource};
///
/// struct StaticSource;
///
/// #[async_trait]
/// impl VisualizationSource for StaticSource {
///     fn name(&self) -> &str {
///         "Static Source"
///     }
///
///     fn key(&self) -> &str {
///         "static"
///     }
///
///     async fn get_fields(&self) -> IndexMap<String, String> {
///         IndexMap::from([("year".to_string(), "year".to_string())])
///     }
///
///     async fn get_records(&self) -> IndexMap<String, Record> {
///         IndexMap::new()
///     }
/// }
/// ```
#[async_trait]
pub trait VisualizationSource: Send + Sync {
    /// Human-readable plugin name, shown in listings and logs.
    fn name(&self) -> &str;

    /// Stable identifier of the plugin. Part of every cache key the plugin
    /// writes, so it must not change between releases.
    fn key(&self) -> &str;

    /// Field identifiers of the dataset, each mapped to itself, in the order
    /// the remote schema lists them.
    async fn get_fields(&self) -> IndexMap<String, String>;

    /// Dataset rows keyed by record id.
    async fn get_records(&self) -> IndexMap<String, Record>;

    /// Settings this source accepts.
    fn configuration_form(&self) -> ConfigForm {
        ConfigForm::new()
    }
}
