use clap::Parser;

use eventease::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.validate().map_err(anyhow::Error::msg)?;

    let (settings, environment) = load_and_merge_config(&cli)?;
    init_logger_from_settings(&settings)?;

    tracing::debug!(
        version = %eventease::pkg_version(),
        environment = %environment.as_str(),
        "Starting eventease"
    );

    execute_command(&cli, settings, environment).await.inspect_err(|e| {
        tracing::error!(error = %e, "Command failed");
    })
}
