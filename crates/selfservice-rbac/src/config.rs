//! Desired-state configuration and the API credential.
//!
//! Both are built once at startup and passed by reference afterwards.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::error::{Result, SyncError};
use crate::model::{AccessType, RoleName};

/// Environment variable holding the bearer token.
pub const ACCESS_TOKEN_ENV: &str = "SELF_SERVICE_API_TOKEN";

/// Group managed by the baseline driver when the config names none.
pub const DEFAULT_GROUP_NAME: &str = "CloudEngineers";

/// Declared target state, read from a JSON file.
///
/// Every collection defaults to empty so the same file can drive both the
/// baseline and the ownership runs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub roles: Vec<DeclaredRole>,
    #[serde(default = "default_group_name")]
    pub group_name: String,
    /// Emails that must be members of the managed group.
    #[serde(default)]
    pub cloudengineers: Vec<String>,
    /// Role bindings the managed group must hold.
    #[serde(default)]
    pub cloudengineer_roles: Vec<GroupRoleBinding>,
    /// Roles that must already exist before ownership bootstrapping starts.
    #[serde(default)]
    pub required_roles: Vec<RoleName>,
}

fn default_group_name() -> String {
    DEFAULT_GROUP_NAME.to_string()
}

/// A role and the permissions it must carry, per namespace.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredRole {
    pub name: RoleName,
    #[serde(default)]
    pub permissions: IndexMap<String, Vec<String>>,
    /// Only used by the seed export.
    #[serde(default)]
    pub description: Option<String>,
    /// Only used by the seed export.
    #[serde(default)]
    pub existing_id: Option<String>,
}

/// A role the managed group must hold, at a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRoleBinding {
    pub role_name: RoleName,
    pub scope: AccessType,
}

impl AppConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SyncError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    /// Parse and validate config content; `path` is only used in errors.
    pub fn from_json(content: &str, path: impl AsRef<Path>) -> Result<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|source| SyncError::ConfigParse {
                path: path.as_ref().to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for role in &self.roles {
            if role.name.key().is_empty() {
                return Err(SyncError::invalid_config("role name must not be empty"));
            }
            if !seen.insert(role.name.key()) {
                return Err(SyncError::invalid_config(format!(
                    "role '{}' is declared more than once",
                    role.name
                )));
            }
        }
        if self.group_name.is_empty() {
            return Err(SyncError::invalid_config("groupName must not be empty"));
        }
        Ok(())
    }

    /// The backend base URL; must be an absolute http(s) URL.
    pub fn api_base_url(&self) -> Result<Url> {
        if self.api_url.is_empty() {
            return Err(SyncError::invalid_config("apiUrl is not set"));
        }
        let url = Url::parse(&self.api_url).map_err(|e| {
            SyncError::invalid_config(format!("apiUrl '{}' is not a valid URL: {e}", self.api_url))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(SyncError::invalid_config(format!(
                "apiUrl must use http or https, got '{other}'"
            ))),
        }
    }
}

/// Bearer token for the backend. `Debug` never prints the value.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Read the token from [`ACCESS_TOKEN_ENV`].
    pub fn from_env() -> Result<Self> {
        Self::from_value(std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    pub fn from_value(value: Option<String>) -> Result<Self> {
        match value {
            Some(token) if !token.is_empty() => Ok(Self(token)),
            _ => Err(SyncError::MissingCredential(ACCESS_TOKEN_ENV)),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
