//! vizkit Core Library
//!
//! This is the core library for vizkit, a plugin suite for configuring data
//! visualisations backed by remote tabular datasets. It provides everything
//! that is shared between source plugins, style plugins and the host.
//!
//! ## Architecture
//!
//! - [`visualization_manager`] - High-level interface binding a visualisation to its source
//! - [`style`] - Field selection, label overrides and record grouping shared by all styles
//! - [`cache`] - Cache store contract plus in-memory and file-backed stores
//! - [`configs`] - Configuration parsing for visualisation files
//! - [`download`] - Dataset download link discovery
//! - [`results`] - Result types for manager operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! Source plugins receive an `Arc<dyn CacheStore>` and implement
//! [`vizkit_plugin_protocol::VisualizationSource`]. The host loads a
//! visualisation file and hands both to a [`VisualizationManager`]:
//!
//! ```rust
//! use vizkit_core::cache::{cache_key, CacheStore, MemoryCacheStore};
//! use std::time::Duration;
//!
//! let store = MemoryCacheStore::new();
//! let key = cache_key("ckan", "resource-1", "fields");
//! store.set(&key, serde_json::json!([]), Duration::from_secs(60));
//! assert!(store.get(&key).is_some());
//! ```

pub mod cache;
pub mod configs;
pub mod download;
pub mod results;
pub mod style;
pub mod types;
pub mod visualization_manager;

#[cfg(test)]
mod test_support;

// Re-export the main types for easier usage
pub use types::{VizkitError, VizkitResult};
pub use visualization_manager::VisualizationManager;
