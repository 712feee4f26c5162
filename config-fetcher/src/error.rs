//! Error types for config fetching

use crate::format::FormatTag;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote service error: {0}")]
    RemoteService(String),

    #[error("Failed to decode {format} config: {message}")]
    Decode { format: FormatTag, message: String },
}

impl FetchError {
    pub(crate) fn missing_secret_vars() -> Self {
        FetchError::Configuration(
            "environment variables for gcp are not set; \
             please set 'PROJECT_ID', 'SECRET_NAME', and 'SECRET_VERSION'"
                .to_string(),
        )
    }

    pub(crate) fn no_config_data() -> Self {
        FetchError::Configuration(
            "no config data provided; populate it with read_file() or read_secret() first"
                .to_string(),
        )
    }

    /// True when the error came from the remote secret service or its client.
    pub fn is_remote(&self) -> bool {
        matches!(self, FetchError::RemoteService(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::RemoteService(err.to_string())
    }
}

impl From<serde_yaml::Error> for FetchError {
    fn from(err: serde_yaml::Error) -> Self {
        FetchError::Decode {
            format: FormatTag::Yaml,
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode {
            format: FormatTag::Json,
            message: err.to_string(),
        }
    }
}
