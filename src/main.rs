//! ragkeeper CLI entry point.

use clap::Parser;

use ragkeeper::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = ragkeeper::cli::run(cli).await {
        ragkeeper::cli::handle_error(err, json);
    }
}
