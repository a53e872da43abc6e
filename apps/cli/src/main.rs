mod config;
mod main_lib;
mod metrics;

use clap::Parser;
use config::{Cli, Command};
use main_lib::{init_tracing, run_sync, show_sync, shutdown_token};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    match &cli.command {
        Command::Run(args) => {
            let cancel = shutdown_token();
            run_sync(&cli.api, args, &cancel).await
        }
        Command::Show(args) => show_sync(&cli.api, args).await,
    }
}
