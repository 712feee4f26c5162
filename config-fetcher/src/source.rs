//! Config sources and the raw bytes they produce

use crate::decode::{self, AsFormat};
use crate::env::{get_env, Environment};
use crate::{FetchError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_SECRET_VERSION: &str = "latest";

/// A versioned secret in Google Cloud Secret Manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    pub project_id: String,
    pub secret_name: String,
    #[serde(default = "default_version")]
    pub secret_version: String,
}

fn default_version() -> String {
    DEFAULT_SECRET_VERSION.to_string()
}

impl SecretRef {
    pub fn new(project_id: impl Into<String>, secret_name: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            secret_name: secret_name.into(),
            secret_version: default_version(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.secret_version = version.into();
        self
    }

    /// Builds a reference from the environment:
    ///   `PROJECT_ID`      required
    ///   `SECRET_NAME`     required
    ///   `SECRET_VERSION`  optional, defaults to `latest`
    ///
    /// Missing required values come back empty; [`SecretRef::validate`]
    /// rejects them when the secret is resolved.
    pub fn from_env(env: &dyn Environment) -> Self {
        Self {
            project_id: get_env(env, "PROJECT_ID", ""),
            secret_name: get_env(env, "SECRET_NAME", ""),
            secret_version: get_env(env, "SECRET_VERSION", DEFAULT_SECRET_VERSION),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_id.is_empty() || self.secret_name.is_empty() {
            return Err(FetchError::missing_secret_vars());
        }
        Ok(())
    }

    /// `projects/{project}/secrets/{secret}/versions/{version}`
    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/secrets/{}/versions/{}",
            self.project_id, self.secret_name, self.secret_version
        )
    }
}

/// Where raw config bytes come from. Exactly one source per resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    File(PathBuf),
    RemoteSecret(SecretRef),
}

impl SourceSelector {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceSelector::File(path.into())
    }

    pub fn secret(secret: SecretRef) -> Self {
        SourceSelector::RemoteSecret(secret)
    }

    pub fn secret_from_env(env: &dyn Environment) -> Self {
        SourceSelector::RemoteSecret(SecretRef::from_env(env))
    }
}

/// Config bytes exactly as read from a source.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawConfig {
    data: Vec<u8>,
}

impl RawConfig {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decodes the bytes into `dest`. See [`decode::decode_into`].
    pub fn decode_into<T: DeserializeOwned>(&self, format: impl AsFormat, dest: &mut T) -> Result<()> {
        decode::decode_into(format, &self.data, dest)
    }

    pub fn decode<T: DeserializeOwned>(&self, format: impl AsFormat) -> Result<T> {
        decode::decode(format, &self.data)
    }
}

impl From<Vec<u8>> for RawConfig {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl AsRef<[u8]> for RawConfig {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
