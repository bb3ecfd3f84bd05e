//! Elasticsearch API generation selector.

use crate::error::EsConvertError;
use std::fmt;
use std::str::FromStr;

/// Major API generation of the target cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EsVersion {
    /// Elasticsearch 7.x.
    V7,
    /// Elasticsearch 8.x.
    V8,
}

impl EsVersion {
    /// `"v7"` or `"v8"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            EsVersion::V7 => "v7",
            EsVersion::V8 => "v8",
        }
    }
}

impl FromStr for EsVersion {
    type Err = EsConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v7" => Ok(EsVersion::V7),
            "v8" => Ok(EsVersion::V8),
            other => Err(EsConvertError::Version(other.to_string())),
        }
    }
}

impl fmt::Display for EsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
