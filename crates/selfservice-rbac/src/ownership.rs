//! Capability ownership bootstrap.
//!
//! For every capability that is not deleted: if its metadata declares an
//! owner, members become contributors and the declared owner becomes owner;
//! otherwise every member becomes owner.
//!
//! Failing to read one capability's members or metadata skips that
//! capability. Failing to grant a role aborts the whole run.

use std::fmt;

use tracing::{info, warn};

use crate::backend::RbacBackend;
use crate::config::AppConfig;
use crate::error::{Result, SyncError};
use crate::model::{AvailableRoles, Capability, CapabilityMetadata, RoleGrantRequest, RoleName};

pub const OWNER_ROLE: &str = "owner";
pub const CONTRIBUTOR_ROLE: &str = "contributor";

/// Why a capability got no grants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Deleted,
    MemberFetchFailed(String),
    MalformedMetadata(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::MemberFetchFailed(e) => write!(f, "failed to fetch members: {e}"),
            Self::MalformedMetadata(e) => write!(f, "failed to parse metadata: {e}"),
        }
    }
}

/// Terminal state of one capability after a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityOutcome {
    Skipped(SkipReason),
    OwnerDeclared { owner: String, contributors: usize },
    NoOwnerDeclared { owners: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub processed: usize,
    pub owner_grants: usize,
    pub contributor_grants: usize,
    pub skipped: Vec<(String, SkipReason)>,
}

impl BootstrapReport {
    fn record(&mut self, capability_id: &str, outcome: CapabilityOutcome) {
        self.processed += 1;
        match outcome {
            CapabilityOutcome::Skipped(reason) => {
                self.skipped.push((capability_id.to_string(), reason));
            }
            CapabilityOutcome::OwnerDeclared { contributors, .. } => {
                self.contributor_grants += contributors;
                self.owner_grants += 1;
            }
            CapabilityOutcome::NoOwnerDeclared { owners } => {
                self.owner_grants += owners;
            }
        }
    }

    pub fn grants(&self) -> usize {
        self.owner_grants + self.contributor_grants
    }
}

/// Fail if any role in `required` is missing from `available`.
pub fn check_required_roles(available: &AvailableRoles, required: &[RoleName]) -> Result<()> {
    match required.iter().find(|name| !available.contains(name)) {
        Some(missing) => Err(SyncError::MissingRequiredRole(missing.to_string())),
        None => Ok(()),
    }
}

pub struct OwnershipBootstrapper<'a, B: ?Sized> {
    backend: &'a B,
    owner_role_id: String,
    contributor_role_id: String,
}

impl<'a, B: RbacBackend + ?Sized> OwnershipBootstrapper<'a, B> {
    /// Resolve the owner and contributor roles up front; an unknown name is
    /// an error rather than an empty grant target.
    pub fn new(backend: &'a B, roles: &AvailableRoles) -> Result<Self> {
        let owner_role_id = roles.require_id(&RoleName::new(OWNER_ROLE))?.to_string();
        let contributor_role_id = roles
            .require_id(&RoleName::new(CONTRIBUTOR_ROLE))?
            .to_string();
        Ok(Self {
            backend,
            owner_role_id,
            contributor_role_id,
        })
    }

    pub async fn run(&self, capabilities: &[Capability]) -> Result<BootstrapReport> {
        let mut report = BootstrapReport::default();
        for capability in capabilities {
            let outcome = self.bootstrap_capability(capability).await?;
            report.record(&capability.id, outcome);
        }
        Ok(report)
    }

    /// Process one capability. Only a failed grant is returned as an error.
    pub async fn bootstrap_capability(&self, capability: &Capability) -> Result<CapabilityOutcome> {
        info!(capability = %capability.id, "processing capability");

        if capability.is_deleted() {
            return Ok(CapabilityOutcome::Skipped(SkipReason::Deleted));
        }

        let members = match self.backend.capability_members(&capability.id).await {
            Ok(members) => members,
            Err(e) => {
                warn!(capability = %capability.id, error = %e, "failed to fetch members; skipping");
                return Ok(CapabilityOutcome::Skipped(SkipReason::MemberFetchFailed(
                    e.to_string(),
                )));
            }
        };

        let metadata = match CapabilityMetadata::parse(&capability.json_metadata) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(capability = %capability.id, error = %e, "failed to parse metadata; skipping");
                return Ok(CapabilityOutcome::Skipped(SkipReason::MalformedMetadata(
                    e.to_string(),
                )));
            }
        };

        match metadata.declared_owner() {
            Some(owner) => {
                for member in &members {
                    self.grant(&self.contributor_role_id, CONTRIBUTOR_ROLE, &member.id, &capability.id)
                        .await?;
                }
                self.grant(&self.owner_role_id, OWNER_ROLE, owner, &capability.id)
                    .await?;
                Ok(CapabilityOutcome::OwnerDeclared {
                    owner: owner.to_string(),
                    contributors: members.len(),
                })
            }
            None => {
                for member in &members {
                    self.grant(&self.owner_role_id, OWNER_ROLE, &member.id, &capability.id)
                        .await?;
                }
                Ok(CapabilityOutcome::NoOwnerDeclared {
                    owners: members.len(),
                })
            }
        }
    }

    async fn grant(&self, role_id: &str, role: &str, user: &str, capability_id: &str) -> Result<()> {
        self.backend
            .grant_role(&RoleGrantRequest::for_capability_user(role_id, user, capability_id))
            .await
            .map_err(SyncError::during("grant role", format!("{capability_id}/{role}/{user}")))?;
        tracing::debug!(capability = capability_id, role, user, "granted role");
        Ok(())
    }
}

/// Check required roles, then bootstrap ownership on every capability.
pub async fn run_ownership<B: RbacBackend + ?Sized>(
    backend: &B,
    config: &AppConfig,
) -> Result<BootstrapReport> {
    info!(">> Starting capability ownership bootstrap...");

    let roles = backend.available_roles().await?;
    check_required_roles(&roles, &config.required_roles)?;
    let bootstrapper = OwnershipBootstrapper::new(backend, &roles)?;

    let capabilities = backend.capabilities().await?;
    info!(count = capabilities.len(), "fetched capabilities");

    let report = bootstrapper.run(&capabilities).await?;
    info!(
        processed = report.processed,
        grants = report.grants(),
        skipped = report.skipped.len(),
        "<< Capability ownership bootstrap completed."
    );
    Ok(report)
}
