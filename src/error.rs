use thiserror::Error;

/// Main error type for the scoring service
#[derive(Error, Debug)]
pub enum MintscoreError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Input errors — reported to the caller, never retried
    #[error("Invalid input: {0}")]
    Input(String),

    // Feature extraction errors carry the offending mint and field
    #[error("Feature extraction failed for mint {mint} ({field}): {detail}")]
    FeatureExtraction {
        mint: String,
        field: &'static str,
        detail: String,
    },

    // Training-only: every candidate example produced an all-zero vector
    #[error("No usable training signal: every feature vector was all-zero")]
    NoSignal,

    // Model artifact errors (corrupt file, bad shape)
    #[error("Model artifact error: {0}")]
    Artifact(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for MintscoreError
pub type Result<T> = std::result::Result<T, MintscoreError>;

impl MintscoreError {
    /// Whether the failure is the caller's fault. The request boundary maps
    /// these to 4xx responses; everything else is a server error.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Input(_) | Self::NoSignal | Self::FeatureExtraction { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(MintscoreError::Input("empty".into()).is_client_error());
        assert!(MintscoreError::NoSignal.is_client_error());
        assert!(!MintscoreError::Artifact("corrupt".into()).is_client_error());
        assert!(!MintscoreError::Internal("boom".into()).is_client_error());
    }
}
