//! Error types shared by topic crates.

use thiserror::Error;

/// Error type for domain type validation and (de)serialization.
#[derive(Debug, Error)]
pub enum TypesError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
