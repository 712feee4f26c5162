//! Config loader that resolves one source and decodes it

use crate::config::SecretManagerConfig;
use crate::decode::AsFormat;
use crate::env::Environment;
use crate::providers::{GcpSecretManagerProvider, SecretProvider};
use crate::{RawConfig, Result, SecretRef, SourceSelector};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

pub struct ConfigLoader<P = GcpSecretManagerProvider> {
    provider: P,
}

impl ConfigLoader {
    /// Loader backed by Secret Manager with default client settings.
    pub fn new() -> Self {
        Self::with_config(SecretManagerConfig::default())
    }

    pub fn with_config(config: SecretManagerConfig) -> Self {
        Self::with_provider(GcpSecretManagerProvider::new(config))
    }

    /// Loader whose Secret Manager client settings come from `env`.
    pub fn from_env(env: &dyn Environment) -> Self {
        Self::with_config(SecretManagerConfig::from_env(env))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SecretProvider> ConfigLoader<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Fetches raw bytes from exactly one source.
    pub fn resolve_source(&self, selector: &SourceSelector) -> Result<RawConfig> {
        match selector {
            SourceSelector::File(path) => self.read_file(path),
            SourceSelector::RemoteSecret(secret) => self.read_secret(secret),
        }
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<RawConfig> {
        let path = path.as_ref();
        debug!("Reading config file: {}", path.display());

        let data = std::fs::read(path)?;
        Ok(RawConfig::new(data))
    }

    /// Fetches a secret payload. Fails before any network access when the
    /// project or secret name is empty.
    pub fn read_secret(&self, secret: &SecretRef) -> Result<RawConfig> {
        secret.validate()?;
        debug!(
            provider = self.provider.name(),
            secret = %secret.resource_name(),
            "Fetching config secret"
        );

        let data = self.provider.access_secret_version(secret)?;
        Ok(RawConfig::new(data))
    }

    /// Reads `PROJECT_ID`, `SECRET_NAME` and `SECRET_VERSION` from `env`
    /// and fetches that secret.
    pub fn read_secret_from_env(&self, env: &dyn Environment) -> Result<RawConfig> {
        self.read_secret(&SecretRef::from_env(env))
    }

    /// Resolves `selector` and decodes the bytes into `dest`, stopping at the
    /// first error.
    pub fn load_struct<T: DeserializeOwned>(
        &self,
        selector: &SourceSelector,
        format: impl AsFormat,
        dest: &mut T,
    ) -> Result<()> {
        let raw = self.resolve_source(selector)?;
        raw.decode_into(format, dest)
    }

    /// Like [`ConfigLoader::load_struct`] but returns the decoded value.
    pub fn load<T: DeserializeOwned>(&self, selector: &SourceSelector, format: impl AsFormat) -> Result<T> {
        self.resolve_source(selector)?.decode(format)
    }
}
