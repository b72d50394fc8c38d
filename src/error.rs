//! Error types for select-forge operations.
//!
//! Fatal conditions surface as [`SelectionError`]. Configuration problems are
//! reported through [`ConfigError`] and wrapped on the way out. Input and
//! report file problems are [`ExportError`]. Recoverable conditions (the
//! empty-pool fallback, degenerate metrics) are not errors; see
//! [`crate::selection::SelectionWarning`].

use thiserror::Error;

pub use crate::selection::config::ConfigError;

/// Errors that can occur during a selection call.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Invalid candidate '{id}': {reason}")]
    InvalidCandidate { id: String, reason: String },

    #[error("Embedding dimension mismatch for '{id}': expected {expected}, got {actual}")]
    EmbeddingDimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Candidate '{0}' appears more than once in the pool")]
    DuplicateCandidate(String),
}

/// Errors that can occur while reading inputs or writing reports.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid export format: {0}")]
    InvalidFormat(String),

    #[error("Failed to parse '{path}': {reason}")]
    InvalidInput { path: String, reason: String },

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_error_display() {
        let err = SelectionError::InvalidCandidate {
            id: "gen_3".to_string(),
            reason: "resonance is not finite".to_string(),
        };
        assert!(err.to_string().contains("gen_3"));
        assert!(err.to_string().contains("resonance"));

        let err = SelectionError::EmbeddingDimensionMismatch {
            id: "gen_1".to_string(),
            expected: 64,
            actual: 32,
        };
        assert!(err.to_string().contains("expected 64, got 32"));

        let err = SelectionError::DuplicateCandidate("gen_2".to_string());
        assert!(err.to_string().contains("gen_2"));
    }

    #[test]
    fn test_export_error_display() {
        let err = ExportError::InvalidInput {
            path: "pool.json".to_string(),
            reason: "missing field `id`".to_string(),
        };
        assert!(err.to_string().contains("pool.json"));

        let err = ExportError::InvalidFormat("toml".to_string());
        assert_eq!(err.to_string(), "Invalid export format: toml");
    }

    #[test]
    fn test_configuration_error_wraps() {
        let err: SelectionError = ConfigError::ValidationFailed("k must be greater than 0".into()).into();
        assert!(matches!(err, SelectionError::Configuration(_)));
        assert!(err.to_string().contains("k must be greater than 0"));
    }
}
