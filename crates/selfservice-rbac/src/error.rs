//! Error types for the RBAC reconciliation tooling.
//!
//! Every variant carries the key of the resource that failed (role name,
//! group name, request URL, ...). Callers never retry: a returned error
//! means the run stops.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Errors raised while loading desired state or talking to the backend.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("invalid access type: {0}")]
    InvalidAccessType(String),

    #[error("required role '{0}' not found in available roles")]
    MissingRequiredRole(String),

    #[error("role '{0}' not found in available roles after creation step")]
    RoleNotFound(String),

    #[error("group '{0}' not found after creation step")]
    GroupNotFound(String),

    #[error("request {method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {method} {url}: {body}")]
    UnexpectedStatus {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{action} failed for {key}: {source}")]
    Step {
        action: &'static str,
        key: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("seed export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

impl SyncError {
    /// Create a new InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Wrap an error with the reconciliation step and the key it failed on.
    ///
    /// ```
    /// use selfservice_rbac::SyncError;
    ///
    /// let wrap = SyncError::during("create role", "Reader");
    /// let err = wrap(SyncError::invalid_config("boom"));
    /// assert_eq!(err.to_string(), "create role failed for Reader: invalid configuration: boom");
    /// ```
    pub fn during(action: &'static str, key: impl Into<String>) -> impl FnOnce(SyncError) -> SyncError {
        let key = key.into();
        move |source| Self::Step {
            action,
            key,
            source: Box::new(source),
        }
    }

    /// Startup errors abort before any backend call is made.
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::ConfigRead { .. }
                | Self::ConfigParse { .. }
                | Self::InvalidConfig(_)
                | Self::MissingCredential(_)
                | Self::InvalidAccessType(_)
                | Self::MissingRequiredRole(_)
        )
    }

    /// Whether the backend answered, but with a status the call does not accept.
    pub fn is_unexpected_status(&self) -> bool {
        match self {
            Self::UnexpectedStatus { .. } => true,
            Self::Step { source, .. } => source.is_unexpected_status(),
            _ => false,
        }
    }
}
