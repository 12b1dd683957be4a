use clap::Parser;
use selfservice_rbac_cli::cli::OwnershipCli;
use selfservice_rbac_cli::{commands, run_main};

#[tokio::main]
async fn main() {
    run_main(|| async {
        let cli = OwnershipCli::parse();
        commands::ownership::run(&cli.config).await
    })
    .await;
}
