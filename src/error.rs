//! Error types for the partial dependence engine

use thiserror::Error;

/// Result type alias for pdp-explorer operations
pub type Result<T> = std::result::Result<T, PdpError>;

/// Main error type for the engine
#[derive(Error, Debug)]
pub enum PdpError {
    /// Bad output destination, unreadable report, invalid settings
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A requested feature has no entry in the feature catalog
    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    /// Input that makes a computation undefined (too few features to
    /// cluster, zero spread of the prediction output)
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Raised by a user-supplied prediction function
    #[error("Prediction error: {0}")]
    PredictionError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Type mismatch for column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PdpError {
    fn from(err: serde_json::Error) -> Self {
        PdpError::SerializationError(err.to_string())
    }
}

impl From<polars::error::PolarsError> for PdpError {
    fn from(err: polars::error::PolarsError) -> Self {
        PdpError::DataError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PdpError {
    fn from(err: ndarray::ShapeError) -> Self {
        PdpError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for PdpError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        PdpError::ThreadPoolError(err.to_string())
    }
}
