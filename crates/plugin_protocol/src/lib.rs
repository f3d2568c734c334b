//! # vizkit Plugin Protocol
//!
//! Shared vocabulary between the vizkit host and its plugins.
//!
//! A visualisation is assembled from two kinds of plugins:
//!
//! - **Source plugins** implement [`VisualizationSource`] and know how to
//!   retrieve the field schema and rows of a remote tabular dataset.
//! - **Style plugins** decide how those rows are labelled, grouped and
//!   rendered. The reusable part of every style lives in `vizkit_core`.
//!
//! Both kinds describe their settings with a declarative [`ConfigForm`] that
//! the host renders however it likes.
//!
//! ## Core types
//!
//! - [`Record`] - one row of a dataset, an ordered field → value map
//! - [`Field`] - one column of a dataset
//! - [`DataFilters`] - optional free-text query and structured filters
//! - [`SourceError`] - the failures a source can run into
//!
//! ## Example
//!
//! ```rust
//! use vizkit_plugin_protocol::DataFilters;
//!
//! let filters = DataFilters::from_config(Some("  water "), Some(r#"{"year": " 2020 "}"#));
//! assert_eq!(filters.q.as_deref(), Some("water"));
//! assert_eq!(filters.filters.unwrap()["year"], "2020");
//! ```

pub mod error;
pub mod form;
pub mod traits;
pub mod types;

pub use error::{SourceError, SourceResult};
pub use form::{ConfigForm, FormElement, FormElementKind};
pub use traits::VisualizationSource;
pub use types::{DataFilters, Field, Record, RECORD_ID_FIELD};
