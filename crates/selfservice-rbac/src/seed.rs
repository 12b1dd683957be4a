//! Offline export of declared roles and permissions as database seed CSVs.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::config::DeclaredRole;
use crate::error::Result;
use crate::model::{AccessType, EntityType};

pub const ROLES_FILE: &str = "RbacRole.csv";
pub const PERMISSION_GRANTS_FILE: &str = "RbacPermissionGrants.csv";

/// Owner recorded on seeded system roles.
pub const SYSTEM_OWNER_ID: &str = "0000DFD5-0000-0000-0000-00000000000A";

const ROLE_HEADER: [&str; 7] = [
    "Id",
    "OwnerId",
    "CreatedAt",
    "UpdatedAt",
    "Name",
    "Description",
    "Type",
];

const GRANT_HEADER: [&str; 8] = [
    "Id",
    "CreatedAt",
    "AssignedEntityType",
    "AssignedEntityId",
    "Namespace",
    "Permission",
    "Type",
    "Resource",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleRow {
    pub id: String,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    pub description: String,
    pub role_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantRow {
    pub id: String,
    pub created_at: String,
    pub assigned_entity_type: String,
    pub assigned_entity_id: String,
    pub namespace: String,
    pub permission: String,
    pub grant_type: String,
    pub resource: String,
}

#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub roles: Vec<RoleRow>,
    pub grants: Vec<GrantRow>,
}

/// Build seed rows for `roles`, stamped with `now`.
///
/// A role keeps its declared `existingId`; otherwise it gets a fresh UUID.
pub fn build_seed(roles: &[DeclaredRole], now: OffsetDateTime) -> Result<Seed> {
    let timestamp = now.format(&Rfc3339)?;
    let mut seed = Seed::default();

    for role in roles {
        let role_id = role
            .existing_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let description = role
            .description
            .clone()
            .unwrap_or_else(|| format!("Automatically created role: {}", role.name));

        seed.roles.push(RoleRow {
            id: role_id.clone(),
            owner_id: SYSTEM_OWNER_ID.to_string(),
            created_at: timestamp.clone(),
            updated_at: timestamp.clone(),
            name: role.name.to_string(),
            description,
            role_type: "System".to_string(),
        });

        for (namespace, permissions) in &role.permissions {
            let permissions: IndexSet<&String> = permissions.iter().collect();
            for permission in permissions {
                seed.grants.push(GrantRow {
                    id: Uuid::new_v4().to_string(),
                    created_at: timestamp.clone(),
                    assigned_entity_type: EntityType::Role.to_string(),
                    assigned_entity_id: role_id.clone(),
                    namespace: namespace.clone(),
                    permission: permission.clone(),
                    grant_type: AccessType::Global.to_string(),
                    resource: String::new(),
                });
            }
        }
    }

    Ok(seed)
}

/// Write `rows` as `;`-separated CSV under `header`.
pub fn write_csv<W: Write, R: Serialize>(writer: W, header: &[&str], rows: &[R]) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);
    out.write_record(header)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

impl Seed {
    /// Write both seed files into `dir` and return their paths.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let roles_path = dir.join(ROLES_FILE);
        let grants_path = dir.join(PERMISSION_GRANTS_FILE);
        write_csv(File::create(&roles_path)?, &ROLE_HEADER, &self.roles)?;
        write_csv(File::create(&grants_path)?, &GRANT_HEADER, &self.grants)?;
        tracing::info!(
            roles = self.roles.len(),
            grants = self.grants.len(),
            dir = %dir.display(),
            "seed files written"
        );
        Ok((roles_path, grants_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use time::macros::datetime;

    fn declared() -> Vec<DeclaredRole> {
        let raw = r#"{"roles":[
            {"name":"Owner","existingId":"36202DFB","description":"Full access to all resources",
             "permissions":{"topics":["create","read-public"],"aws":["read","read"]}},
            {"name":"Guest","permissions":{"topics":["read-public"]}}
        ]}"#;
        AppConfig::from_json(raw, "c.json").unwrap().roles
    }

    #[test]
    fn test_build_seed_rows() {
        let seed = build_seed(&declared(), datetime!(2024-05-01 12:00 UTC)).unwrap();

        assert_eq!(seed.roles.len(), 2);
        let owner = &seed.roles[0];
        assert_eq!(owner.id, "36202DFB");
        assert_eq!(owner.owner_id, SYSTEM_OWNER_ID);
        assert_eq!(owner.description, "Full access to all resources");
        assert_eq!(owner.role_type, "System");
        assert_eq!(owner.created_at, "2024-05-01T12:00:00Z");

        let guest = &seed.roles[1];
        assert!(Uuid::parse_str(&guest.id).is_ok());
        assert_eq!(guest.description, "Automatically created role: Guest");

        // duplicate "read" collapses
        assert_eq!(seed.grants.len(), 4);
        assert!(seed.grants[..3].iter().all(|g| g.assigned_entity_id == "36202DFB"));
        assert_eq!(seed.grants[3].assigned_entity_id, guest.id);
        assert!(seed.grants.iter().all(|g| g.assigned_entity_type == "Role"
            && g.grant_type == "Global"
            && g.resource.is_empty()));
    }

    #[test]
    fn test_write_csv_uses_semicolons_and_header() {
        let seed = build_seed(&declared(), datetime!(2024-05-01 12:00 UTC)).unwrap();
        let mut buf = Vec::new();
        write_csv(&mut buf, &ROLE_HEADER, &seed.roles[..1]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Id;OwnerId;CreatedAt;UpdatedAt;Name;Description;Type"));
        assert_eq!(
            lines.next(),
            Some("36202DFB;0000DFD5-0000-0000-0000-00000000000A;2024-05-01T12:00:00Z;2024-05-01T12:00:00Z;Owner;Full access to all resources;System")
        );
    }

    #[test]
    fn test_write_to_dir_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let seed = build_seed(&[], OffsetDateTime::now_utc()).unwrap();
        let (roles, grants) = seed.write_to_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(roles).unwrap().lines().count(), 1);
        assert_eq!(std::fs::read_to_string(grants).unwrap().lines().count(), 1);
    }
}
