use std::path::PathBuf;

use clap::{Args, Parser};

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "SELFSERVICE_RBAC_CONFIG";

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the desired-state JSON file
    #[arg(short, long, env = CONFIG_ENV, default_value = "config.json")]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
#[command(name = "setup-baseline-permissions")]
#[command(about = "Converge roles, permissions and the managed group towards the declared baseline")]
#[command(version)]
pub struct BaselineCli {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser, Debug)]
#[command(name = "initialize-capability-roles")]
#[command(about = "Grant capability-scoped owner and contributor roles from capability metadata")]
#[command(version)]
pub struct OwnershipCli {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Parser, Debug)]
#[command(name = "generate-rbac-seed")]
#[command(about = "Export declared roles and permissions as database seed CSV files")]
#[command(version)]
pub struct SeedCli {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Directory the CSV files are written to
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,
}
