//! The backend surface the reconcilers are written against.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::role::group_by_namespace;
use crate::model::{
    AvailableRoles, Capability, CapabilityMember, Group, NewGroup, NewRole, PermissionGrant,
    PermissionGrantRequest, PermissionsByNamespace, RoleAssignment, RoleGrantRequest, SystemRole,
};

/// Typed read/write access to the RBAC collections of the SelfService API.
///
/// Every call is a single attempt. Implementations must not retry.
#[async_trait]
pub trait RbacBackend: Send + Sync {
    async fn assignable_roles(&self) -> Result<Vec<SystemRole>>;

    async fn create_role(&self, role: &NewRole) -> Result<()>;

    async fn role_permissions(&self, role_id: &str) -> Result<Vec<PermissionGrant>>;

    async fn grant_permission(&self, grant: &PermissionGrantRequest) -> Result<()>;

    async fn groups(&self) -> Result<Vec<Group>>;

    async fn create_group(&self, group: &NewGroup) -> Result<()>;

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<()>;

    /// Never called by the reconcilers; membership convergence is additive.
    async fn remove_group_member(&self, group_id: &str, member_id: &str) -> Result<()>;

    async fn group_role_grants(&self, group_id: &str) -> Result<Vec<RoleAssignment>>;

    async fn grant_role(&self, grant: &RoleGrantRequest) -> Result<()>;

    async fn capabilities(&self) -> Result<Vec<Capability>>;

    async fn capability_members(&self, capability_id: &str) -> Result<Vec<CapabilityMember>>;

    /// Assignable roles keyed by lower-cased name.
    async fn available_roles(&self) -> Result<AvailableRoles> {
        Ok(AvailableRoles::from_roles(self.assignable_roles().await?))
    }

    /// A role's permissions grouped by namespace.
    async fn permissions_by_namespace(&self, role_id: &str) -> Result<PermissionsByNamespace> {
        Ok(group_by_namespace(self.role_permissions(role_id).await?))
    }
}
