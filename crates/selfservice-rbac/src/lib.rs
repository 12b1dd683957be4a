//! Reconciliation of SelfService RBAC state against a declared baseline.
//!
//! Two drivers share this crate:
//!
//! - [`baseline::run_baseline`] creates declared roles, grants their declared
//!   permissions, and converges one privileged group's role bindings and
//!   membership.
//! - [`ownership::run_ownership`] grants capability-scoped owner and
//!   contributor roles derived from each capability's metadata.
//!
//! Both only ever add. Anything observed but not declared is reported.

pub mod backend;
pub mod baseline;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod ownership;
pub mod reconcile;
pub mod seed;

pub use backend::RbacBackend;
pub use baseline::run_baseline;
pub use client::SelfServiceClient;
pub use config::{ACCESS_TOKEN_ENV, AccessToken, AppConfig, DeclaredRole, GroupRoleBinding};
pub use diff::{Difference, differences};
pub use error::{Result, SyncError};
pub use ownership::{BootstrapReport, OwnershipBootstrapper, run_ownership};
pub use reconcile::{Anomaly, ReconcileReport};
