use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// Logical kind of set a backend can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetType {
    /// Genotype calls (GA4GH `CallSet`)
    #[serde(rename = "CALLSET")]
    CallSet,
    /// Sequencing reads (GA4GH `ReadGroupSet`)
    #[serde(rename = "READSET")]
    ReadSet,
}

impl SetType {
    /// Wire name used by the browser in the `setType` parameter
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CallSet => "CALLSET",
            Self::ReadSet => "READSET",
        }
    }
}

impl std::fmt::Display for SetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SetType {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CALLSET" => Ok(Self::CallSet),
            "READSET" => Ok(Self::ReadSet),
            other => Err(ProxyError::ClientInput(format!(
                "setType must be CALLSET or READSET, got '{other}'"
            ))),
        }
    }
}

/// Revision of the GA4GH schema a backend speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchemaVersion {
    /// v0.5.1: plural id arrays (`datasetIds`, `variantSetIds`)
    V0_5_1,
    /// v0.6.0: singular ids (`datasetId`, `variantSetId`)
    V0_6_0,
}

impl SchemaVersion {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V0_5_1 => "0.5.1",
            Self::V0_6_0 => "0.6.0",
        }
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SchemaVersion {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0.5.1" => Ok(Self::V0_5_1),
            "0.6.0" => Ok(Self::V0_6_0),
            other => Err(ProxyError::UnsupportedSchemaVersion(other.to_string())),
        }
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = ProxyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.as_str().to_string()
    }
}

/// Optional server-side features a backend may offer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Set search honours the `name` filter upstream
    #[serde(default)]
    pub supports_name_filter: bool,
    /// Upstream accepts a `fields` selector (partial response)
    #[serde(default)]
    pub supports_partial_response: bool,
}

/// A dataset exposed by a backend, addressed by its provider-scoped id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub display_name: String,
    pub id: String,
}

impl Dataset {
    pub fn new(display_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            id: id.into(),
        }
    }
}
