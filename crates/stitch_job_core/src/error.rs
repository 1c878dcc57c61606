use thiserror::Error;

/// Terminal failures of a single trigger invocation. None are retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StitchError {
    #[error("could not create object storage client: {reason}")]
    MissingCredentials { reason: String },
    #[error("invalid trigger request: {0}")]
    InvalidRequest(String),
    #[error("Could not parse key: {key}")]
    InvalidKeyFormat { key: String },
    #[error("failed to list objects in bucket '{bucket}' with prefix '{prefix}': {message}")]
    DiscoveryFailed {
        bucket: String,
        prefix: String,
        message: String,
    },
    #[error("Not enough videos to pass to stitcher, only found {found} videos")]
    InsufficientInputs { found: usize },
}

impl StitchError {
    /// Stable snake_case label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidKeyFormat { .. } => "invalid_key_format",
            Self::DiscoveryFailed { .. } => "discovery_failed",
            Self::InsufficientInputs { .. } => "insufficient_inputs",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_inputs_message_carries_count() {
        let error = StitchError::InsufficientInputs { found: 2 };
        assert_eq!(
            error.to_string(),
            "Not enough videos to pass to stitcher, only found 2 videos"
        );
        assert_eq!(error.kind(), "insufficient_inputs");
    }
}
