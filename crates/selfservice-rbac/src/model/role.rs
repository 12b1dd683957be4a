//! Roles, permission grants and role assignments.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{AccessType, EntityType};
use crate::error::{Result, SyncError};

/// A role name compared case-insensitively.
///
/// The display form is kept for logging and for create calls; equality and
/// hashing use the lower-cased key only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoleName {
    display: String,
    key: String,
}

impl RoleName {
    pub fn new(name: impl Into<String>) -> Self {
        let display = name.into();
        let key = display.to_lowercase();
        Self { display, key }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Normalized comparison key.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl From<String> for RoleName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for RoleName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<RoleName> for String {
    fn from(value: RoleName) -> Self {
        value.display
    }
}

impl PartialEq for RoleName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for RoleName {}

impl Hash for RoleName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// A role as listed by `GET /rbac/get-assignable-roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemRole {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub role_type: String,
}

/// Body of `POST /rbac/role`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRole {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub role_type: AccessType,
}

impl NewRole {
    /// Global role with the generated description used for roles this tool creates.
    pub fn generated(name: &RoleName) -> Self {
        Self {
            name: name.as_str().to_string(),
            description: format!("Automatically created role: {name}"),
            role_type: AccessType::Global,
        }
    }
}

/// A permission attached to some entity, as returned by `GET /rbac/permission/role/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PermissionGrant {
    pub namespace: String,
    pub permission: String,
    #[serde(rename = "type", default)]
    pub grant_type: String,
    #[serde(default)]
    pub resource: String,
}

/// Permissions of one entity grouped by namespace.
pub type PermissionsByNamespace = BTreeMap<String, Vec<String>>;

pub fn group_by_namespace(grants: impl IntoIterator<Item = PermissionGrant>) -> PermissionsByNamespace {
    let mut by_namespace = PermissionsByNamespace::new();
    for grant in grants {
        by_namespace
            .entry(grant.namespace)
            .or_default()
            .push(grant.permission);
    }
    by_namespace
}

/// Body of `POST /rbac/permission/grant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrantRequest {
    pub namespace: String,
    pub permission: String,
    #[serde(rename = "type")]
    pub grant_type: AccessType,
    pub resource: String,
    pub assigned_entity_type: EntityType,
    pub assigned_entity_id: String,
}

impl PermissionGrantRequest {
    /// Global grant of `namespace`/`permission` to a role, on every resource.
    pub fn for_role(role_id: &str, namespace: &str, permission: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            permission: permission.to_string(),
            grant_type: AccessType::Global,
            resource: "*".to_string(),
            assigned_entity_type: EntityType::Role,
            assigned_entity_id: role_id.to_string(),
        }
    }
}

/// An existing role assignment as reported by the backend.
///
/// Scope and entity type are kept as raw strings since the backend may
/// report values this tool has no variant for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub role_id: String,
    #[serde(default)]
    pub assigned_entity_type: String,
    #[serde(default)]
    pub assigned_entity_id: String,
    #[serde(rename = "type", default)]
    pub assignment_type: String,
    #[serde(default)]
    pub resource: String,
}

/// Body of `POST /rbac/role/grant`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleGrantRequest {
    pub role_id: String,
    pub assigned_entity_type: EntityType,
    pub assigned_entity_id: String,
    #[serde(rename = "type")]
    pub assignment_type: AccessType,
    pub resource: String,
}

impl RoleGrantRequest {
    /// Group-level binding; the resource is left empty.
    pub fn for_group(role_id: &str, group_id: &str, scope: AccessType) -> Self {
        Self {
            role_id: role_id.to_string(),
            assigned_entity_type: EntityType::Group,
            assigned_entity_id: group_id.to_string(),
            assignment_type: scope,
            resource: String::new(),
        }
    }

    /// Capability-scoped binding for a single user.
    pub fn for_capability_user(role_id: &str, user: &str, capability_id: &str) -> Self {
        Self {
            role_id: role_id.to_string(),
            assigned_entity_type: EntityType::User,
            assigned_entity_id: user.to_string(),
            assignment_type: AccessType::Capability,
            resource: capability_id.to_string(),
        }
    }
}

/// The assignable roles keyed by lower-cased name.
#[derive(Debug, Clone, Default)]
pub struct AvailableRoles {
    by_key: BTreeMap<String, SystemRole>,
}

impl AvailableRoles {
    /// Build the lookup; on a case-insensitive name clash the first role wins.
    pub fn from_roles(roles: impl IntoIterator<Item = SystemRole>) -> Self {
        let mut by_key = BTreeMap::new();
        for role in roles {
            match by_key.entry(role.name.to_lowercase()) {
                Entry::Vacant(slot) => {
                    slot.insert(role);
                }
                Entry::Occupied(existing) => {
                    tracing::warn!(
                        name = %role.name,
                        id = %role.id,
                        kept = %existing.get().id,
                        "duplicate role name in assignable roles; ignoring later entry"
                    );
                }
            }
        }
        Self { by_key }
    }

    pub fn get(&self, name: &RoleName) -> Option<&SystemRole> {
        self.by_key.get(name.key())
    }

    pub fn contains(&self, name: &RoleName) -> bool {
        self.by_key.contains_key(name.key())
    }

    pub fn id_of(&self, name: &RoleName) -> Option<&str> {
        self.get(name).map(|role| role.id.as_str())
    }

    /// Like [`AvailableRoles::id_of`], but an unknown name is an error.
    pub fn require_id(&self, name: &RoleName) -> Result<&str> {
        self.id_of(name)
            .ok_or_else(|| SyncError::RoleNotFound(name.to_string()))
    }

    /// Reverse lookup used when reporting assignments by role id.
    pub fn name_of_id(&self, id: &str) -> Option<&str> {
        self.by_key
            .values()
            .find(|role| role.id == id)
            .map(|role| role.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemRole> {
        self.by_key.values()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
