use clap::Parser;
use solvetrack::cli::{self, Cli};
use tracing::error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli::log_level(cli.verbose))
        .with_target(false)
        .init();

    if let Err(e) = cli::execute(cli).await {
        error!("Fatal error: {e}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
