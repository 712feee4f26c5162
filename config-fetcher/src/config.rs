//! Configuration for the Secret Manager client

use crate::env::{get_env, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://secretmanager.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretManagerConfig {
    /// Base URL of the Secret Manager REST API
    pub endpoint: String,

    /// OAuth2 bearer token. When unset, Application Default Credentials are used.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    /// Service account key file. When unset, Application Default Credentials
    /// are discovered (gcloud user credentials, then the metadata server).
    pub credentials_file: Option<String>,

    /// Request timeout. `None` keeps the HTTP client default.
    pub timeout_seconds: Option<u64>,
}

impl Default for SecretManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
            credentials_file: None,
            timeout_seconds: None,
        }
    }
}

impl SecretManagerConfig {
    /// Reads client settings:
    ///   `SECRET_MANAGER_ENDPOINT`        optional
    ///   `GOOGLE_OAUTH_ACCESS_TOKEN`      optional
    ///   `GOOGLE_APPLICATION_CREDENTIALS` optional, path to a service account key
    ///   `SECRET_MANAGER_TIMEOUT`         optional, seconds
    ///
    /// A timeout that is not a whole number of seconds is ignored.
    pub fn from_env(env: &dyn Environment) -> Self {
        let timeout_seconds = env.var("SECRET_MANAGER_TIMEOUT").and_then(|s| match s.trim().parse() {
            Ok(secs) => Some(secs),
            Err(e) => {
                debug!("Ignoring SECRET_MANAGER_TIMEOUT={:?}: {}", s, e);
                None
            }
        });

        Self {
            endpoint: get_env(env, "SECRET_MANAGER_ENDPOINT", DEFAULT_ENDPOINT),
            access_token: env.var("GOOGLE_OAUTH_ACCESS_TOKEN").filter(|t| !t.is_empty()),
            credentials_file: env.var("GOOGLE_APPLICATION_CREDENTIALS").filter(|p| !p.is_empty()),
            timeout_seconds,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_credentials_file(mut self, path: impl Into<String>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }
}
