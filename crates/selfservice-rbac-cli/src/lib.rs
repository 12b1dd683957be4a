//! Shared plumbing for the `setup-baseline-permissions`,
//! `initialize-capability-roles` and `generate-rbac-seed` binaries.

pub mod cli;
pub mod commands;
pub mod observability;
pub mod output;

use std::future::Future;

use anyhow::Result;

use output::print_error;

/// Load `.env`, start logging, run `command`, and exit 1 on failure.
///
/// `command` is only invoked after `.env` is loaded so that clap's `env`
/// fallbacks see its values.
pub async fn run_main<F, Fut>(command: F)
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    if let Err(e) = command().await {
        tracing::error!(error = %format!("{e:#}"), "run failed");
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
