//! Baseline run: roles, their permissions, the managed group, its role
//! bindings and its members, in that order.

use tracing::{debug, info};

use crate::backend::RbacBackend;
use crate::config::AppConfig;
use crate::error::{Result, SyncError};
use crate::model::group::find_by_name;
use crate::reconcile::{
    ReconcileReport, ensure_group, reconcile_group_roles, reconcile_membership,
    reconcile_permissions, reconcile_roles,
};

/// Converge the backend towards the roles, permissions and group declared
/// in `config`. The first failed call aborts the run.
pub async fn run_baseline<B: RbacBackend + ?Sized>(
    backend: &B,
    config: &AppConfig,
) -> Result<ReconcileReport> {
    info!(">> Starting baseline permissions setup...");
    debug!(api_url = %config.api_url, roles = config.roles.len(), group = %config.group_name, "configuration loaded");

    let mut report = ReconcileReport::default();

    debug!(">> Consolidating roles list...");
    let observed = backend.available_roles().await?;
    reconcile_roles(backend, &config.roles, &observed, &mut report).await?;

    let roles = backend.available_roles().await?;
    for role in roles.iter() {
        debug!(name = %role.name, id = %role.id, "available role");
    }

    for role in &config.roles {
        let role_id = roles
            .id_of(&role.name)
            .ok_or_else(|| SyncError::RoleNotFound(role.name.to_string()))?;
        reconcile_permissions(backend, role, role_id, &mut report).await?;
    }

    debug!(group = %config.group_name, ">> Consolidating groups...");
    let group = ensure_group(backend, &config.group_name, &mut report).await?;

    reconcile_group_roles(
        backend,
        &group,
        &config.cloudengineer_roles,
        &roles,
        &mut report,
    )
    .await?;

    reconcile_membership(backend, &group, &config.cloudengineers, &mut report).await?;

    if config.debug {
        let groups = backend.groups().await?;
        if let Some(group) = find_by_name(&groups, &config.group_name) {
            for member in &group.members {
                debug!(group = %group.name, member = %member.user_id, "final member");
            }
        }
    }

    info!(
        changes = report.changes(),
        anomalies = report.anomalies.len(),
        "<< Baseline permissions setup completed."
    );
    Ok(report)
}
