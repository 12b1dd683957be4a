#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use selfservice_rbac::model::{
    Capability, CapabilityMember, EntityType, Group, GroupMember, NewGroup, NewRole,
    PermissionGrant, PermissionGrantRequest, RoleAssignment, RoleGrantRequest, SystemRole,
};
use selfservice_rbac::{AppConfig, RbacBackend, Result, SyncError};

/// A mutating call observed by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateRole(String),
    GrantPermission {
        role_id: String,
        namespace: String,
        permission: String,
    },
    CreateGroup(String),
    AddMember {
        group_id: String,
        user_id: String,
    },
    RemoveMember {
        group_id: String,
        member_id: String,
    },
    GrantRole(RoleGrantRequest),
}

#[derive(Default)]
struct State {
    roles: Vec<SystemRole>,
    permissions: HashMap<String, Vec<PermissionGrant>>,
    groups: Vec<Group>,
    group_grants: HashMap<String, Vec<RoleAssignment>>,
    capabilities: Vec<Capability>,
    members: HashMap<String, Vec<CapabilityMember>>,
    failing_member_fetch: HashSet<String>,
    failing_ops: HashSet<&'static str>,
    forget_created_roles: bool,
    calls: Vec<Call>,
    member_fetches: Vec<String>,
    next_id: usize,
}

/// In-memory backend that applies writes to its own state and records them.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

fn failure(op: &str) -> SyncError {
    SyncError::UnexpectedStatus {
        method: "POST",
        url: format!("fake://{op}"),
        status: 500,
        body: "injected failure".to_string(),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().roles.push(SystemRole {
            id: id.to_string(),
            name: name.to_string(),
            role_type: "Global".to_string(),
        });
        self
    }

    pub fn with_permission(self, role_id: &str, namespace: &str, permission: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .permissions
            .entry(role_id.to_string())
            .or_default()
            .push(PermissionGrant {
                namespace: namespace.to_string(),
                permission: permission.to_string(),
                grant_type: "Global".to_string(),
                resource: "*".to_string(),
            });
        self
    }

    pub fn with_group(self, id: &str, name: &str, members: &[&str]) -> Self {
        self.state.lock().unwrap().groups.push(Group {
            id: id.to_string(),
            name: name.to_string(),
            members: members
                .iter()
                .map(|m| GroupMember {
                    user_id: m.to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn with_group_grant(self, group_id: &str, role_id: &str, scope: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .group_grants
            .entry(group_id.to_string())
            .or_default()
            .push(RoleAssignment {
                role_id: role_id.to_string(),
                assigned_entity_type: "Group".to_string(),
                assigned_entity_id: group_id.to_string(),
                assignment_type: scope.to_string(),
                resource: String::new(),
            });
        self
    }

    pub fn with_capability(self, id: &str, status: &str, metadata: &str, members: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.capabilities.push(Capability {
                id: id.to_string(),
                status: status.to_string(),
                json_metadata: metadata.to_string(),
            });
            state.members.insert(
                id.to_string(),
                members
                    .iter()
                    .map(|m| CapabilityMember {
                        id: m.to_string(),
                        email: format!("{m}@x.com"),
                    })
                    .collect(),
            );
        }
        self
    }

    pub fn failing_member_fetch(self, capability_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_member_fetch
            .insert(capability_id.to_string());
        self
    }

    /// Make every call of the named operation fail with HTTP 500.
    pub fn failing(self, op: &'static str) -> Self {
        self.state.lock().unwrap().failing_ops.insert(op);
        self
    }

    /// Accept `create_role` calls without the role ever showing up in later reads.
    pub fn forgetting_created_roles(self) -> Self {
        self.state.lock().unwrap().forget_created_roles = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn member_fetches(&self) -> Vec<String> {
        self.state.lock().unwrap().member_fetches.clone()
    }

    pub fn role_grants(&self) -> Vec<RoleGrantRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::GrantRole(grant) => Some(grant),
                _ => None,
            })
            .collect()
    }

    fn check(state: &State, op: &'static str) -> Result<()> {
        if state.failing_ops.contains(op) {
            return Err(failure(op));
        }
        Ok(())
    }
}

#[async_trait]
impl RbacBackend for FakeBackend {
    async fn assignable_roles(&self) -> Result<Vec<SystemRole>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, "assignable_roles")?;
        Ok(state.roles.clone())
    }

    async fn create_role(&self, role: &NewRole) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, "create_role")?;
        if !state.forget_created_roles {
            state.next_id += 1;
            let id = format!("role-{}", state.next_id);
            state.roles.push(SystemRole {
                id,
                name: role.name.clone(),
                role_type: role.role_type.to_string(),
            });
        }
        state.calls.push(Call::CreateRole(role.name.clone()));
        Ok(())
    }

    async fn role_permissions(&self, role_id: &str) -> Result<Vec<PermissionGrant>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, "role_permissions")?;
        Ok(state.permissions.get(role_id).cloned().unwrap_or_default())
    }

    async fn grant_permission(&self, grant: &PermissionGrantRequest) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, "grant_permission")?;
        assert_eq!(grant.assigned_entity_type, EntityType::Role);
        state
            .permissions
            .entry(grant.assigned_entity_id.clone())
            .or_default()
            .push(PermissionGrant {
                namespace: grant.namespace.clone(),
                permission: grant.permission.clone(),
                grant_type: grant.grant_type.to_string(),
                resource: grant.resource.clone(),
            });
        state.calls.push(Call::GrantPermission {
            role_id: grant.assigned_entity_id.clone(),
            namespace: grant.namespace.clone(),
            permission: grant.permission.clone(),
        });
        Ok(())
    }

    async fn groups(&self) -> Result<Vec<Group>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, "groups")?;
        Ok(state.groups.clone())
    }

    async fn create_group(&self, group: &NewGroup) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, "create_group")?;
        state.next_id += 1;
        let id = format!("group-{}", state.next_id);
        state.groups.push(Group {
            id,
            name: group.name.clone(),
            members: Vec::new(),
        });
        state.calls.push(Call::CreateGroup(group.name.clone()));
        Ok(())
    }

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, "add_group_member")?;
        if let Some(group) = state.groups.iter_mut().find(|g| g.id == group_id) {
            group.members.push(GroupMember {
                user_id: user_id.to_string(),
            });
        }
        state.calls.push(Call::AddMember {
            group_id: group_id.to_string(),
            user_id: user_id.to_string(),
        });
        Ok(())
    }

    async fn remove_group_member(&self, group_id: &str, member_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RemoveMember {
            group_id: group_id.to_string(),
            member_id: member_id.to_string(),
        });
        Ok(())
    }

    async fn group_role_grants(&self, group_id: &str) -> Result<Vec<RoleAssignment>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, "group_role_grants")?;
        Ok(state.group_grants.get(group_id).cloned().unwrap_or_default())
    }

    async fn grant_role(&self, grant: &RoleGrantRequest) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check(&state, "grant_role")?;
        if grant.assigned_entity_type == EntityType::Group {
            state
                .group_grants
                .entry(grant.assigned_entity_id.clone())
                .or_default()
                .push(RoleAssignment {
                    role_id: grant.role_id.clone(),
                    assigned_entity_type: "Group".to_string(),
                    assigned_entity_id: grant.assigned_entity_id.clone(),
                    assignment_type: grant.assignment_type.to_string(),
                    resource: grant.resource.clone(),
                });
        }
        state.calls.push(Call::GrantRole(grant.clone()));
        Ok(())
    }

    async fn capabilities(&self) -> Result<Vec<Capability>> {
        let state = self.state.lock().unwrap();
        Self::check(&state, "capabilities")?;
        Ok(state.capabilities.clone())
    }

    async fn capability_members(&self, capability_id: &str) -> Result<Vec<CapabilityMember>> {
        let mut state = self.state.lock().unwrap();
        state.member_fetches.push(capability_id.to_string());
        if state.failing_member_fetch.contains(capability_id) {
            return Err(SyncError::UnexpectedStatus {
                method: "GET",
                url: format!("fake://capabilities/{capability_id}/members"),
                status: 503,
                body: String::new(),
            });
        }
        Ok(state.members.get(capability_id).cloned().unwrap_or_default())
    }
}

pub fn config(json: &str) -> AppConfig {
    AppConfig::from_json(json, "test-config.json").expect("valid test config")
}
