//! Serialization formats accepted for raw config data

use crate::{FetchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Yaml,
    Json,
}

impl FormatTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Yaml => "yaml",
            FormatTag::Json => "json",
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatTag {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yaml" => Ok(FormatTag::Yaml),
            "json" => Ok(FormatTag::Json),
            other => Err(FetchError::Configuration(format!(
                "invalid config type `{}`; expected `yaml` or `json` to match the data being decoded",
                other
            ))),
        }
    }
}

impl TryFrom<&str> for FormatTag {
    type Error = FetchError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}
