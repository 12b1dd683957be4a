use clap::Parser;
use selfservice_rbac_cli::cli::BaselineCli;
use selfservice_rbac_cli::{commands, run_main};

#[tokio::main]
async fn main() {
    run_main(|| async {
        let cli = BaselineCli::parse();
        commands::baseline::run(&cli.config).await
    })
    .await;
}
