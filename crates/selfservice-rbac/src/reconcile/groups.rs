use indexmap::IndexSet;
use tracing::{debug, info};

use super::{Anomaly, ReconcileReport};
use crate::backend::RbacBackend;
use crate::config::GroupRoleBinding;
use crate::diff::differences;
use crate::error::{Result, SyncError};
use crate::model::group::find_by_name;
use crate::model::{AvailableRoles, Group, NewGroup, RoleGrantRequest};

/// Make sure a group named exactly `name` exists and return it.
///
/// The group list is fetched again after the (possible) create so the
/// returned value reflects the backend.
pub async fn ensure_group<B: RbacBackend + ?Sized>(
    backend: &B,
    name: &str,
    report: &mut ReconcileReport,
) -> Result<Group> {
    let groups = backend.groups().await?;
    if find_by_name(&groups, name).is_none() {
        info!(group = name, "group does not exist; creating it");
        backend
            .create_group(&NewGroup::generated(name))
            .await
            .map_err(SyncError::during("create group", name))?;
        report.groups_created += 1;
    }

    let groups = backend.groups().await?;
    for group in &groups {
        debug!(group = %group.name, id = %group.id, members = group.members.len(), "available group");
    }
    find_by_name(&groups, name)
        .cloned()
        .ok_or_else(|| SyncError::GroupNotFound(name.to_string()))
}

/// Give `group` every declared role binding it lacks; flag undeclared ones.
///
/// A binding is present when an assignment on the group has the same role
/// id and a case-insensitively equal scope. The assignment's resource is
/// not compared.
pub async fn reconcile_group_roles<B: RbacBackend + ?Sized>(
    backend: &B,
    group: &Group,
    bindings: &[GroupRoleBinding],
    roles: &AvailableRoles,
    report: &mut ReconcileReport,
) -> Result<()> {
    let assigned = backend
        .group_role_grants(&group.id)
        .await
        .map_err(SyncError::during("fetch role grants", group.name.as_str()))?;

    debug!(group = %group.name, count = assigned.len(), "group currently has assigned roles");
    for ra in &assigned {
        debug!(
            role_id = %ra.role_id,
            entity_type = %ra.assigned_entity_type,
            entity_id = %ra.assigned_entity_id,
            scope = %ra.assignment_type,
            resource = %ra.resource,
            "assigned role"
        );
    }

    let unique: IndexSet<&GroupRoleBinding> = bindings.iter().collect();
    let mut resolved = Vec::with_capacity(unique.len());
    for binding in unique {
        resolved.push((binding, roles.require_id(&binding.role_name)?));
    }

    for (binding, role_id) in &resolved {
        let present = assigned
            .iter()
            .any(|ra| ra.role_id == *role_id && binding.scope.matches(&ra.assignment_type));
        if present {
            debug!(group = %group.name, role = %binding.role_name, scope = %binding.scope, "role already assigned; no action needed");
            continue;
        }

        info!(group = %group.name, role = %binding.role_name, scope = %binding.scope, "assigning role to group");
        backend
            .grant_role(&RoleGrantRequest::for_group(role_id, &group.id, binding.scope))
            .await
            .map_err(SyncError::during(
                "assign group role",
                format!("{}/{}/{}", group.name, binding.role_name, binding.scope),
            ))?;
        report.group_roles_assigned += 1;
    }

    for ra in assigned {
        let desired = resolved
            .iter()
            .any(|(binding, role_id)| ra.role_id == *role_id && binding.scope.matches(&ra.assignment_type));
        if !desired {
            report.flag(Anomaly::UndeclaredGroupRole {
                group: group.name.clone(),
                role_name: roles.name_of_id(&ra.role_id).map(str::to_string),
                role_id: ra.role_id,
                scope: ra.assignment_type,
            });
        }
    }

    Ok(())
}

/// Add every declared member `group` lacks; flag members that are not declared.
///
/// Members are never removed.
pub async fn reconcile_membership<B: RbacBackend + ?Sized>(
    backend: &B,
    group: &Group,
    desired_members: &[String],
    report: &mut ReconcileReport,
) -> Result<()> {
    let diff = differences(desired_members, &group.member_ids());

    for member in &diff.only_in_a {
        info!(group = %group.name, member = %member, "adding missing member");
        backend
            .add_group_member(&group.id, member)
            .await
            .map_err(SyncError::during("add member", format!("{}/{member}", group.name)))?;
        report.members_added += 1;
    }

    for member in diff.only_in_b {
        report.flag(Anomaly::UnexpectedMember {
            group: group.name.clone(),
            member,
        });
    }

    Ok(())
}
