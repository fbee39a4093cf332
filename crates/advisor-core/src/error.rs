//! Error types for the FinOps migration advisor

use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingIdentity;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the advisor
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Index not found at {}", path.display())]
    IndexNotFound { path: PathBuf },

    #[error("Embedding mismatch: index was built with {found}, loader uses {expected}")]
    EmbeddingMismatch {
        expected: EmbeddingIdentity,
        found: EmbeddingIdentity,
    },

    #[error("Collection mismatch: expected '{expected}', found '{found}'")]
    CollectionMismatch { expected: String, found: String },

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Completion service error: {0}")]
    Completion(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
