use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::backend::RbacBackend;
use crate::config::AccessToken;
use crate::error::{Result, SyncError};
use crate::model::{
    Capability, CapabilityMember, Group, Items, NewGroup, NewMembership, NewRole,
    PermissionGrant, PermissionGrantRequest, RoleAssignment, RoleGrantRequest, SystemRole,
};

const OK: &[StatusCode] = &[StatusCode::OK];
const CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];
const REMOVED: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];
const PERMISSION_GRANTED: &[StatusCode] =
    &[StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];
const ROLE_GRANTED: &[StatusCode] = &[StatusCode::OK, StatusCode::NO_CONTENT];

/// HTTP client for the SelfService RBAC API.
pub struct SelfServiceClient {
    http: reqwest::Client,
    base_url: Url,
    token: AccessToken,
}

impl SelfServiceClient {
    pub fn new(base_url: Url, token: AccessToken) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(SyncError::invalid_config(format!(
                "apiUrl '{base_url}' cannot be used as a base URL"
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SyncError::invalid_config("apiUrl cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        self.http.request(method, url).bearer_auth(self.token.expose())
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        let resp = self
            .request(Method::GET, url.clone())
            .send()
            .await
            .map_err(|source| transport("GET", &url, source))?;
        let body = check_status("GET", &url, resp, OK).await?;
        serde_json::from_str(&body).map_err(|source| SyncError::Decode {
            url: url.to_string(),
            source,
        })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
        accepted: &[StatusCode],
    ) -> Result<()> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");
        let resp = self
            .request(Method::POST, url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| transport("POST", &url, source))?;
        check_status("POST", &url, resp, accepted).await?;
        Ok(())
    }

    async fn delete(&self, segments: &[&str], accepted: &[StatusCode]) -> Result<()> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "DELETE");
        let resp = self
            .request(Method::DELETE, url.clone())
            .send()
            .await
            .map_err(|source| transport("DELETE", &url, source))?;
        check_status("DELETE", &url, resp, accepted).await?;
        Ok(())
    }
}

#[async_trait]
impl RbacBackend for SelfServiceClient {
    async fn assignable_roles(&self) -> Result<Vec<SystemRole>> {
        self.get_json(&["rbac", "get-assignable-roles"]).await
    }

    async fn create_role(&self, role: &NewRole) -> Result<()> {
        self.post_json(&["rbac", "role"], role, CREATED).await
    }

    async fn role_permissions(&self, role_id: &str) -> Result<Vec<PermissionGrant>> {
        self.get_json(&["rbac", "permission", "role", role_id]).await
    }

    async fn grant_permission(&self, grant: &PermissionGrantRequest) -> Result<()> {
        self.post_json(&["rbac", "permission", "grant"], grant, PERMISSION_GRANTED)
            .await
    }

    async fn groups(&self) -> Result<Vec<Group>> {
        self.get_json(&["rbac", "groups"]).await
    }

    async fn create_group(&self, group: &NewGroup) -> Result<()> {
        self.post_json(&["rbac", "groups"], group, CREATED).await
    }

    async fn add_group_member(&self, group_id: &str, user_id: &str) -> Result<()> {
        let body = NewMembership {
            user_id: user_id.to_string(),
            group_id: group_id.to_string(),
        };
        self.post_json(&["rbac", "groups", group_id, "members"], &body, CREATED)
            .await
    }

    async fn remove_group_member(&self, group_id: &str, member_id: &str) -> Result<()> {
        self.delete(&["rbac", "groups", group_id, "members", member_id], REMOVED)
            .await
    }

    async fn group_role_grants(&self, group_id: &str) -> Result<Vec<RoleAssignment>> {
        self.get_json(&["rbac", "role", "groups", group_id]).await
    }

    async fn grant_role(&self, grant: &RoleGrantRequest) -> Result<()> {
        self.post_json(&["rbac", "role", "grant"], grant, ROLE_GRANTED).await
    }

    async fn capabilities(&self) -> Result<Vec<Capability>> {
        let page: Items<Capability> = self.get_json(&["capabilities"]).await?;
        Ok(page.items)
    }

    async fn capability_members(&self, capability_id: &str) -> Result<Vec<CapabilityMember>> {
        let page: Items<CapabilityMember> = self
            .get_json(&["capabilities", capability_id, "members"])
            .await?;
        Ok(page.items)
    }
}

fn transport(method: &'static str, url: &Url, source: reqwest::Error) -> SyncError {
    SyncError::Transport {
        method,
        url: url.to_string(),
        source,
    }
}

/// Return the body text if the status is one of `accepted`.
async fn check_status(
    method: &'static str,
    url: &Url,
    resp: reqwest::Response,
    accepted: &[StatusCode],
) -> Result<String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|source| transport(method, url, source))?;
    if !accepted.contains(&status) {
        return Err(SyncError::UnexpectedStatus {
            method,
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> SelfServiceClient {
        let token = AccessToken::from_value(Some("t".into())).unwrap();
        SelfServiceClient::new(Url::parse(base).unwrap(), token).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let c = client("http://localhost:8080/api/");
        let url = c.endpoint(&["rbac", "groups", "g1", "members"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/rbac/groups/g1/members");

        let c = client("http://localhost:8080");
        let url = c.endpoint(&["rbac", "get-assignable-roles"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/rbac/get-assignable-roles");
    }

    #[test]
    fn test_endpoint_escapes_identifiers() {
        let c = client("http://localhost:8080");
        let url = c
            .endpoint(&["rbac", "groups", "g1", "members", "a b/c@x.com"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/rbac/groups/g1/members/a%20b%2Fc@x.com"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let token = AccessToken::from_value(Some("t".into())).unwrap();
        let err = SelfServiceClient::new(Url::parse("mailto:x@y.z").unwrap(), token);
        assert!(err.is_err());
    }
}
