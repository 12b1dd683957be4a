//! Capabilities and the slice of their metadata used for ownership.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Metadata key naming a capability's declared owner.
pub const OWNER_METADATA_KEY: &str = "dfds.owner";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub json_metadata: String,
}

impl Capability {
    pub fn is_deleted(&self) -> bool {
        self.status.eq_ignore_ascii_case("deleted")
    }
}

/// Member of a capability. Not the same shape as a group member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapabilityMember {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// Typed view over a capability's `jsonMetadata`.
///
/// Only the owner is modelled; every other field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityMetadata {
    owner: Option<String>,
}

impl CapabilityMetadata {
    /// Parse the metadata document.
    ///
    /// The document must be a JSON object (or `null`, read as empty). An
    /// owner value that is not a string counts as no owner.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        let fields: Map<String, Value> = serde_json::from_value(value)?;
        let owner = fields
            .get(OWNER_METADATA_KEY)
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(Self { owner })
    }

    /// The declared owner, if present and non-empty.
    pub fn declared_owner(&self) -> Option<&str> {
        self.owner.as_deref().filter(|o| !o.is_empty())
    }
}
