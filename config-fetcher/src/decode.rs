//! Decoding raw config bytes into caller-owned structures

use crate::format::FormatTag;
use crate::{FetchError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Anything that names a [`FormatTag`]. String names other than `yaml` and
/// `json` fail with [`FetchError::Configuration`].
pub trait AsFormat {
    fn as_format(&self) -> Result<FormatTag>;
}

impl AsFormat for FormatTag {
    fn as_format(&self) -> Result<FormatTag> {
        Ok(*self)
    }
}

impl AsFormat for str {
    fn as_format(&self) -> Result<FormatTag> {
        self.parse()
    }
}

impl AsFormat for String {
    fn as_format(&self) -> Result<FormatTag> {
        self.parse()
    }
}

impl<F: AsFormat + ?Sized> AsFormat for &F {
    fn as_format(&self) -> Result<FormatTag> {
        (**self).as_format()
    }
}

/// Decodes `raw` as `format` and stores the result in `dest`.
///
/// `dest` is only written after the whole input parsed successfully; on
/// error its contents are unspecified and should not be relied on.
pub fn decode_into<T: DeserializeOwned>(format: impl AsFormat, raw: &[u8], dest: &mut T) -> Result<()> {
    *dest = decode(format, raw)?;
    Ok(())
}

/// Decodes `raw` as `format` into a new value.
pub fn decode<T: DeserializeOwned>(format: impl AsFormat, raw: &[u8]) -> Result<T> {
    if raw.is_empty() {
        return Err(FetchError::no_config_data());
    }

    let value = match format.as_format()? {
        FormatTag::Yaml => serde_yaml::from_slice(raw)?,
        FormatTag::Json => serde_json::from_slice(raw)?,
    };
    Ok(value)
}

/// Config data whose shape is not known ahead of time.
///
/// Maps are string keyed; scalars are strings, numbers, booleans or null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigValue(serde_json::Value);

impl ConfigValue {
    /// Looks up a nested value by a dot separated path, e.g. `data.nest_two.nest_two_one`.
    /// List elements are addressed by index.
    pub fn lookup(&self, path: &str) -> Option<&serde_json::Value> {
        let mut current = &self.0;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            current = match current {
                serde_json::Value::Object(map) => map.get(segment)?,
                serde_json::Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Converts into a typed structure. A shape mismatch is a `Decode` error.
    pub fn try_into_typed<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.0)?)
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

impl Deref for ConfigValue {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}
