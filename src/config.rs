use std::env;

use crate::error::{ApiError, ApiResult};

/// Connection parameters for one API account. Immutable once the client is
/// built. `key` and `secret` must both be present before private endpoints
/// work; `otp` is only needed when 2FA is enabled on the account.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub key: Option<String>,
    pub secret: Option<String>,
    pub otp: Option<String>,
}

impl ApiConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            key: None,
            secret: None,
            otp: None,
        }
    }

    pub fn with_credentials(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self.secret = Some(secret.into());
        self
    }

    pub fn with_otp(mut self, otp: impl Into<String>) -> Self {
        self.otp = Some(otp.into());
        self
    }

    /// Read the connection parameters from the environment (a `.env` file is
    /// picked up if present). `API_BASE_URL` is required; `API_KEY`,
    /// `API_SEC` and `API_OTP` are optional.
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();
        let host = env::var("API_BASE_URL")
            .map_err(|_| ApiError::Configuration("API_BASE_URL is not set".into()))?;
        Ok(Self {
            host,
            key: env::var("API_KEY").ok(),
            secret: env::var("API_SEC").ok(),
            otp: env::var("API_OTP").ok(),
        })
    }
}
