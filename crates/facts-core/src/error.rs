//! Error types for fact retrieval and derivation.
//!
//! This module defines [`DataError`] which covers the failures that can occur
//! when fetching a fact repository, parsing it into observations, or looking
//! up a concept during derivation.

use thiserror::Error;

/// Errors that can occur while fetching or deriving financial facts.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The requested symbol was not found upstream.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error parsing data from a fact source.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A concept required by a derivation is absent from the repository.
    #[error("Concept not found: {0}")]
    ConceptNotFound(String),

    /// An observation violated its construction invariants.
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
