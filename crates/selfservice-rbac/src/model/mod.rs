//! Wire and domain types for the SelfService RBAC API.

pub mod capability;
pub mod group;
pub mod role;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SyncError;

pub use capability::{Capability, CapabilityMember, CapabilityMetadata};
pub use group::{Group, GroupMember, NewGroup, NewMembership};
pub use role::{
    AvailableRoles, NewRole, PermissionGrant, PermissionGrantRequest, PermissionsByNamespace,
    RoleAssignment, RoleGrantRequest, RoleName, SystemRole,
};

/// Scope of a role or permission grant.
///
/// Parsing is case-insensitive; the wire form is the capitalised name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessType {
    Global,
    Capability,
    Aws,
    Azure,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Capability => "Capability",
            Self::Aws => "Aws",
            Self::Azure => "Azure",
        }
    }

    /// Case-insensitive comparison against a scope string reported by the backend.
    pub fn matches(&self, observed: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(observed)
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "capability" => Ok(Self::Capability),
            "aws" => Ok(Self::Aws),
            "azure" => Ok(Self::Azure),
            _ => Err(SyncError::InvalidAccessType(s.to_string())),
        }
    }
}

impl Serialize for AccessType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccessType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of entity a grant is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    User,
    Group,
    Role,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Group => "Group",
            Self::Role => "Role",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{"Items": [...]}` envelope used by the capability endpoints.
#[derive(Debug, Deserialize)]
pub struct Items<T> {
    #[serde(rename = "Items", alias = "items", default = "Vec::new")]
    pub items: Vec<T>,
}
