use thiserror::Error;

/// Errors surfaced by the client. Configuration problems are kept apart from
/// transport failures so callers can tell "misconfigured" from "request
/// failed" without string matching.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Invalid base64 private key: {0}")]
    InvalidSecret(#[from] base64::DecodeError),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// True for errors raised before any network I/O happens.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ApiError::Configuration(_) | ApiError::Signing(_) | ApiError::InvalidSecret(_)
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
