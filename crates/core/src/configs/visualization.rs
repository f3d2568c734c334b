use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheExpiry, CACHE_EXPIRY_OPTIONS};
use crate::configs::style::StyleConfig;
use crate::types::{VizkitError, VizkitResult};

/// Global default cache lifetime in seconds.
pub const DEFAULT_CACHE_EXPIRY_SECS: u64 = 3600;

/// A complete visualisation definition.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VisualizationConfig {
    pub title: Option<String>,
    pub source: SourceConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourceConfig {
    /// Source plugin key, e.g. `ckan`.
    pub plugin: String,
    /// URI of the remote resource.
    pub uri: String,
    /// Cache lifetime in seconds. Omit to use the global default.
    pub cache_expiry: Option<u64>,
}

impl SourceConfig {
    pub fn cache_expiry(&self) -> CacheExpiry {
        self.cache_expiry
            .map(CacheExpiry::Seconds)
            .unwrap_or(CacheExpiry::Default)
    }
}

/// Host-wide settings.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    /// Lifetime used when a source asks for the global default.
    #[serde(default = "default_cache_expiry")]
    pub default_cache_expiry: u64,
    /// Directory for the file cache. Relative paths resolve against the config file.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_cache_expiry: DEFAULT_CACHE_EXPIRY_SECS,
            cache_dir: None,
        }
    }
}

fn default_cache_expiry() -> u64 {
    DEFAULT_CACHE_EXPIRY_SECS
}

/// JSON Schema describing visualisation files.
pub fn visualization_config_schema() -> VizkitResult<serde_json::Value> {
    Ok(serde_json::to_value(schemars::schema_for!(VisualizationConfig))?)
}

pub fn parse_visualization_config(yaml_str: &str) -> VizkitResult<VisualizationConfig> {
    let config: VisualizationConfig = serde_yaml::from_str(yaml_str)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &VisualizationConfig) -> VizkitResult<()> {
    if config.source.uri.trim().is_empty() {
        return Err(VizkitError::Config("source.uri must not be empty".to_string()));
    }

    if let Some(expiry) = config.source.cache_expiry {
        if !CACHE_EXPIRY_OPTIONS.contains(&expiry) {
            return Err(VizkitError::Config(format!(
                "source.cacheExpiry {} is not one of: {}",
                expiry,
                CACHE_EXPIRY_OPTIONS
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::style::AxisGrouping;

    #[test]
    fn parses_full_config() {
        let yaml = r#"
title: Rainfall
source:
  plugin: ckan
  uri: https://demo.ckan.org/dataset/rain/resource/abc-123
  cacheExpiry: 1800
style:
  fields: [year, "", total]
  labels: "year|Year"
  splitField: region
  xAxis:
    grouping: values
    valuesField: year
  columnOverrides:
    total: "10\n20"
  dataFilters:
    q: storm
    filters: '{"region": "north"}'
settings:
  defaultCacheExpiry: 600
  cacheDir: .vizkit/cache
"#;
        let config = parse_visualization_config(yaml).unwrap();

        assert_eq!(config.title.as_deref(), Some("Rainfall"));
        assert_eq!(config.source.cache_expiry(), CacheExpiry::Seconds(1800));
        assert_eq!(config.style.fields, vec!["year", "", "total"]);
        assert_eq!(config.style.x_axis.grouping, AxisGrouping::Values);
        assert_eq!(config.style.data_filters().q.as_deref(), Some("storm"));
        assert_eq!(config.settings.default_cache_expiry, 600);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let yaml = "source:\n  plugin: ckan\n  uri: https://example.com/resource/1\n";
        let config = parse_visualization_config(yaml).unwrap();

        assert_eq!(config.source.cache_expiry(), CacheExpiry::Default);
        assert!(config.style.fields.is_empty());
        assert_eq!(config.style.x_axis.grouping, AxisGrouping::Auto);
        assert_eq!(config.settings.default_cache_expiry, DEFAULT_CACHE_EXPIRY_SECS);
    }

    #[test]
    fn rejects_unknown_cache_expiry() {
        let yaml = "source:\n  plugin: ckan\n  uri: https://example.com/resource/1\n  cacheExpiry: 42\n";
        assert!(matches!(
            parse_visualization_config(yaml),
            Err(VizkitError::Config(_))
        ));
    }

    #[test]
    fn schema_describes_top_level_sections() {
        let schema = visualization_config_schema().unwrap();
        let properties = &schema["properties"];

        assert!(properties.get("source").is_some());
        assert!(properties.get("style").is_some());
        assert!(properties.get("settings").is_some());
    }

    #[test]
    fn rejects_unknown_keys_and_empty_uri() {
        let unknown = "source:\n  plugin: ckan\n  uri: x\n  colour: red\n";
        assert!(matches!(
            parse_visualization_config(unknown),
            Err(VizkitError::Yaml(_))
        ));

        let empty = "source:\n  plugin: ckan\n  uri: '  '\n";
        assert!(matches!(
            parse_visualization_config(empty),
            Err(VizkitError::Config(_))
        ));
    }
}
