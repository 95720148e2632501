use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A named chromosome/contig and its length, used for browser navigation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceSegment {
    /// Segment name as the backend reports it (e.g. "1", "chrX")
    pub name: String,

    /// Length in bases. Upstreams send int64 values either as JSON numbers or
    /// as decimal strings; both are accepted and always written back as strings.
    #[serde(
        serialize_with = "serialize_length",
        deserialize_with = "deserialize_length"
    )]
    pub length: u64,
}

impl ReferenceSegment {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }

    /// Build a segment from an upstream object, reading the name and length
    /// from the given keys. Returns None if either is missing or unparseable.
    #[must_use]
    pub fn from_value(
        value: &serde_json::Value,
        name_key: &str,
        length_key: &str,
    ) -> Option<Self> {
        let name = value.get(name_key)?.as_str()?;
        let length = parse_length(value.get(length_key)?)?;
        Some(Self::new(name, length))
    }
}

fn parse_length(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn serialize_length<S: Serializer>(length: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&length.to_string())
}

fn deserialize_length<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Length {
        Number(u64),
        Text(String),
    }

    match Length::deserialize(deserializer)? {
        Length::Number(n) => Ok(n),
        Length::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
