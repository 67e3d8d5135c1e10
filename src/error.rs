use thiserror::Error;

/// Main error type for Relnav
#[derive(Error, Debug)]
pub enum RelnavError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON partition decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML partition decoding errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Person record rejected at the ingestion boundary
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Partition format errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Person not present in the graph
    #[error("Person not found: {0}")]
    PersonNotFound(String),

    /// Query issued before the graph finished building
    #[error("Relationship graph is not ready")]
    GraphNotReady,

    /// Background task failure (join errors from spawned work)
    #[error("Task error: {0}")]
    Task(String),
}

/// Convenient Result type using RelnavError
pub type Result<T> = std::result::Result<T, RelnavError>;
