//! Error types shared across the selectml workspace

use thiserror::Error;

/// Errors surfaced by dataset handling, training, and inference.
#[derive(Error, Debug)]
pub enum SelectError {
    /// Caller input is missing required feature columns
    #[error("missing required features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    /// Inference requested before any model has been trained and persisted
    #[error("no trained model available; run training first")]
    ModelNotReady,

    /// A candidate failed to fit or score; fatal to the whole run
    #[error("training failed for candidate '{candidate}': {reason}")]
    Training { candidate: String, reason: String },

    /// Dataset violates a structural invariant
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Persisted model artifact is unreadable or fails hash verification
    #[error("corrupt model artifact: {0}")]
    CorruptArtifact(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for selectml operations
pub type Result<T> = std::result::Result<T, SelectError>;
