//! Cloud API credential handling

use crate::{Error, Result};

/// Environment variable holding the Cloud API key
pub const API_KEY_ENV: &str = "CONFLUENT_CLOUD_API_KEY";

/// Environment variable holding the Cloud API secret
pub const API_SECRET_ENV: &str = "CONFLUENT_CLOUD_API_SECRET";

/// Confluent Cloud API key pair
#[derive(Clone, Debug)]
pub struct Credentials {
    /// API key, used as the basic-auth username
    pub api_key: String,
    /// API secret, used as the basic-auth password
    pub api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Read credentials from the environment
    ///
    /// Secrets are injected via environment variables by the CI pipeline;
    /// they are never read from files or the manifest.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| Error::CredentialsError(format!("{} is not set", API_KEY_ENV)))?;
        let api_secret = std::env::var(API_SECRET_ENV)
            .map_err(|_| Error::CredentialsError(format!("{} is not set", API_SECRET_ENV)))?;

        if api_key.is_empty() || api_secret.is_empty() {
            return Err(Error::CredentialsError(
                "Confluent Cloud API credentials cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            api_secret,
        })
    }
}
