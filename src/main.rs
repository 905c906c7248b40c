use clap::Parser;
use websize::{load_options, setup_logging, Cli, CliRunner};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    setup_logging(args.debug)?;

    info!("Starting websize v{}", env!("CARGO_PKG_VERSION"));

    let options = load_options(&args).await?;
    let cli_runner = CliRunner::new(options);

    // Dropping the running measurement on Ctrl-C releases its browser session
    tokio::select! {
        result = cli_runner.run(args.command) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received interrupt, stopping");
        }
    }

    Ok(())
}
