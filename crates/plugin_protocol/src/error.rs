//! Errors a visualisation source can run into.

use thiserror::Error;

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Failures while talking to a remote dataset.
///
/// Sources use these internally so that "the dataset is empty" and "the
/// fetch failed" stay distinguishable. The public [`crate::VisualizationSource`]
/// contract still degrades both to an empty result.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure, non-success HTTP status or `success: false` payload.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body or a configured value could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// The configured resource URI does not identify a dataset.
    #[error("invalid resource: {0}")]
    InvalidResource(String),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
