//! CKAN datastore source for vizkit.
//!
//! Reads the field schema and rows of one datastore resource through the
//! portal's `datastore_search` action. Payloads are cached per resource and
//! rows are fetched page by page until the reported total is reached.
//!
//! Remote failures never reach the visualisation: a portal that cannot be
//! reached renders as an empty dataset and the failure is logged.

pub mod client;
pub mod resource;
pub mod source;

pub use client::{DatastoreClient, HttpDatastoreClient, SearchQuery, SearchResult};
pub use resource::ResourceLocator;
pub use source::{CkanSource, ObjectType, PAGE_LIMIT, PLUGIN_KEY};
