use anyhow::{Context, Result};
use selfservice_rbac::run_baseline;

use crate::cli::ConfigArgs;
use crate::output::print_baseline_report;

pub async fn run(args: &ConfigArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let client = super::connect(&config)?;

    let report = run_baseline(&client, &config)
        .await
        .context("Baseline permissions setup failed")?;

    print_baseline_report(&report);
    Ok(())
}
