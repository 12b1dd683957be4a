use tracing::{debug, info};

use super::{Anomaly, ReconcileReport};
use crate::backend::RbacBackend;
use crate::config::DeclaredRole;
use crate::diff::differences;
use crate::error::{Result, SyncError};
use crate::model::{AvailableRoles, NewRole, PermissionGrantRequest, RoleName};

/// Create every declared role missing from `observed`; flag undeclared ones.
///
/// A failed create aborts the run.
pub async fn reconcile_roles<B: RbacBackend + ?Sized>(
    backend: &B,
    desired: &[DeclaredRole],
    observed: &AvailableRoles,
    report: &mut ReconcileReport,
) -> Result<()> {
    let desired_names: Vec<RoleName> = desired.iter().map(|r| r.name.clone()).collect();
    let observed_names: Vec<RoleName> = observed
        .iter()
        .map(|r| RoleName::new(r.name.clone()))
        .collect();
    let diff = differences(&desired_names, &observed_names);

    for name in &diff.only_in_a {
        info!(role = %name, "required role does not exist in the system; creating it");
        backend
            .create_role(&NewRole::generated(name))
            .await
            .map_err(SyncError::during("create role", name.as_str()))?;
        report.roles_created += 1;
    }

    for name in diff.only_in_b {
        report.flag(Anomaly::UndeclaredRole {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Grant every declared permission the role lacks; flag undeclared ones.
///
/// Observed permissions in namespaces the role does not declare are
/// flagged too. A failed grant aborts the run.
pub async fn reconcile_permissions<B: RbacBackend + ?Sized>(
    backend: &B,
    role: &DeclaredRole,
    role_id: &str,
    report: &mut ReconcileReport,
) -> Result<()> {
    debug!(role = %role.name, "verifying permissions");
    let observed = backend
        .permissions_by_namespace(role_id)
        .await
        .map_err(SyncError::during("fetch permissions", role.name.as_str()))?;

    for (namespace, desired) in &role.permissions {
        let existing = observed
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let diff = differences(desired.as_slice(), existing);

        for permission in &diff.only_in_a {
            let grant = PermissionGrantRequest::for_role(role_id, namespace, permission);
            backend.grant_permission(&grant).await.map_err(SyncError::during(
                "grant permission",
                format!("{}/{namespace}/{permission}", role.name),
            ))?;
            report.permissions_granted += 1;
            debug!(
                role = %role.name,
                role_id,
                namespace = %namespace,
                permission = %permission,
                "granted missing permission"
            );
        }

        for permission in diff.only_in_b {
            report.flag(Anomaly::UndeclaredPermission {
                role: role.name.to_string(),
                namespace: namespace.clone(),
                permission,
            });
        }
    }

    for (namespace, permissions) in &observed {
        if role.permissions.contains_key(namespace) {
            continue;
        }
        let diff = differences(&[], permissions.as_slice());
        for permission in diff.only_in_b {
            report.flag(Anomaly::UndeclaredPermission {
                role: role.name.to_string(),
                namespace: namespace.clone(),
                permission,
            });
        }
    }

    Ok(())
}
