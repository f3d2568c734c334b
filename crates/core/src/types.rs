use thiserror::Error;

/// The main error type for vizkit operations
#[derive(Debug, Error)]
pub enum VizkitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

/// Result type alias for vizkit operations
pub type VizkitResult<T> = Result<T, VizkitError>;
