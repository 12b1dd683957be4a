use anyhow::{Context, Result};
use selfservice_rbac::run_ownership;

use crate::cli::ConfigArgs;
use crate::output::print_ownership_report;

pub async fn run(args: &ConfigArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let client = super::connect(&config)?;

    let report = run_ownership(&client, &config)
        .await
        .context("Capability ownership bootstrap failed")?;

    print_ownership_report(&report);
    Ok(())
}
