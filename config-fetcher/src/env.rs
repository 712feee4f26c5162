//! Environment variable access with fallback defaults
//!
//! Lookups go through the [`Environment`] trait so callers and tests can
//! supply a synthetic environment instead of mutating the process one.

use crate::{FetchError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Read access to a set of environment variables.
pub trait Environment {
    /// Returns the value of `key`, or `None` when it is not set.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ProcessEnv {
    /// Loads a `.env` file from the current directory (or a parent) into the
    /// process environment, then returns a handle to it. A missing `.env`
    /// file is not an error.
    pub fn with_dotenv() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => debug!("Loaded environment from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {}", e),
        }
        ProcessEnv
    }

    /// Loads the given env file into the process environment. Variables
    /// already set in the process are kept.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, `Configuration` when a line cannot
    /// be parsed.
    pub fn with_dotenv_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| match e {
            dotenvy::Error::Io(err) => FetchError::Io(err),
            other => FetchError::Configuration(format!("invalid env file {}: {}", path.display(), other)),
        })?;
        debug!("Loaded environment from {}", path.display());
        Ok(ProcessEnv)
    }
}

impl Environment for ProcessEnv {
    /// A variable holding non-UTF-8 bytes counts as set; invalid sequences
    /// are replaced with U+FFFD.
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl Environment for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Returns the value of `key` from `env`, or `fallback` when it is unset.
///
/// A variable that is set to the empty string counts as set.
pub fn get_env(env: &dyn Environment, key: &str, fallback: &str) -> String {
    env.var(key).unwrap_or_else(|| fallback.to_string())
}
