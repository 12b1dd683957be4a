//! Desired-vs-observed reconciliation for roles, permissions and groups.
//!
//! Convergence is additive: missing things are created or granted, extra
//! things are reported as [`Anomaly`] values and logged, never removed.

pub mod groups;
pub mod roles;

use std::fmt;

pub use groups::{ensure_group, reconcile_group_roles, reconcile_membership};
pub use roles::{reconcile_permissions, reconcile_roles};

/// Observed state that is not declared and is left for an operator to review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    UndeclaredRole {
        name: String,
    },
    UndeclaredPermission {
        role: String,
        namespace: String,
        permission: String,
    },
    UndeclaredGroupRole {
        group: String,
        role_id: String,
        role_name: Option<String>,
        scope: String,
    },
    UnexpectedMember {
        group: String,
        member: String,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredRole { name } => {
                write!(f, "role '{name}' exists in the system but is not declared in config")
            }
            Self::UndeclaredPermission {
                role,
                namespace,
                permission,
            } => write!(
                f,
                "role '{role}' has unexpected permission '{permission}' in namespace '{namespace}'"
            ),
            Self::UndeclaredGroupRole {
                group,
                role_id,
                role_name,
                scope,
            } => write!(
                f,
                "group '{group}' has unexpected role assigned (role: {}, id: {role_id}, scope: {scope})",
                role_name.as_deref().unwrap_or("<unknown>")
            ),
            Self::UnexpectedMember { group, member } => {
                write!(f, "group '{group}' has unexpected member '{member}'")
            }
        }
    }
}

/// What a baseline run changed and what it found but left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub roles_created: usize,
    pub permissions_granted: usize,
    pub groups_created: usize,
    pub group_roles_assigned: usize,
    pub members_added: usize,
    pub anomalies: Vec<Anomaly>,
}

impl ReconcileReport {
    /// Log an anomaly at warn level and keep it for the summary.
    pub fn flag(&mut self, anomaly: Anomaly) {
        tracing::warn!("{anomaly}. Please review manually.");
        self.anomalies.push(anomaly);
    }

    /// Number of create/grant/add calls issued.
    pub fn changes(&self) -> usize {
        self.roles_created
            + self.permissions_granted
            + self.groups_created
            + self.group_roles_assigned
            + self.members_added
    }
}
