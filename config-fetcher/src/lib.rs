//! # Config Fetcher
//!
//! Loads configuration from a local file or Google Cloud Secret Manager and
//! decodes it into a caller-supplied structure.
//!
//! ## Sources:
//! - Local files
//! - Google Cloud Secret Manager (`PROJECT_ID`, `SECRET_NAME`, `SECRET_VERSION`)
//!
//! ## Formats:
//! - YAML
//! - JSON
//!
//! Every call is synchronous and makes a single attempt. Nothing is cached
//! between calls.
//!
//! # Example
//!
//! ```no_run
//! use config_fetcher::{ConfigLoader, FormatTag, SourceSelector};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct AppConfig {
//!     database_url: String,
//!     log_level: String,
//! }
//!
//! fn main() -> config_fetcher::Result<()> {
//!     let loader = ConfigLoader::new();
//!
//!     let mut config = AppConfig::default();
//!     loader.load_struct(&SourceSelector::file("config.yaml"), FormatTag::Yaml, &mut config)?;
//!
//!     println!("{:?}", config);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod env;
pub mod error;
pub mod format;
pub mod loader;
pub mod providers;
pub mod source;

pub use config::SecretManagerConfig;
pub use decode::{decode, decode_into, AsFormat, ConfigValue};
pub use env::{get_env, Environment, MapEnv, ProcessEnv};
pub use error::FetchError;
pub use format::FormatTag;
pub use loader::ConfigLoader;
pub use providers::{GcpSecretManagerProvider, SecretProvider};
pub use source::{RawConfig, SecretRef, SourceSelector, DEFAULT_SECRET_VERSION};

use serde::de::DeserializeOwned;
use std::path::Path;

/// Result type for config fetching
pub type Result<T> = std::result::Result<T, FetchError>;

/// Reads the file at `path` and decodes it into `dest`.
pub fn load_from_file<T: DeserializeOwned>(format: impl AsFormat, path: impl AsRef<Path>, dest: &mut T) -> Result<()> {
    ConfigLoader::new().read_file(path)?.decode_into(format, dest)
}

/// Fetches the secret named by `PROJECT_ID`, `SECRET_NAME` and
/// `SECRET_VERSION` and decodes it into `dest`. Client settings are read
/// from the process environment as well (see [`SecretManagerConfig::from_env`]).
pub fn load_from_secret_manager<T: DeserializeOwned>(format: impl AsFormat, dest: &mut T) -> Result<()> {
    let env = ProcessEnv;
    ConfigLoader::from_env(&env)
        .read_secret_from_env(&env)?
        .decode_into(format, dest)
}
