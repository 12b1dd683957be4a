use clap::Parser;
use selfservice_rbac_cli::cli::SeedCli;
use selfservice_rbac_cli::{commands, run_main};

#[tokio::main]
async fn main() {
    run_main(|| async {
        let cli = SeedCli::parse();
        commands::seed::run(&cli)
    })
    .await;
}
