//! Dispatches a parsed command to its handler.

use super::handlers::{MigrateCommandHandler, ServeCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Environment;
use crate::config::settings::Settings;

/// Runs the selected subcommand with already merged settings. A missing
/// subcommand starts the server.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    environment: Environment,
) -> anyhow::Result<()> {
    cli.validate().map_err(anyhow::Error::msg)?;

    match cli.command_or_default() {
        Commands::Serve {
            host,
            port,
            dry_run,
            ..
        } => {
            warn_on_privileged_port(
                host.as_deref().unwrap_or(&settings.server.host),
                port.unwrap_or(settings.server.port),
            );
            ServeCommandHandler::new(settings, environment)
                .execute(dry_run)
                .await
        }
        Commands::Migrate { dry_run, rollback } => {
            if let Some(steps) = rollback
                && steps > LARGE_ROLLBACK
            {
                tracing::warn!(steps, "Rolling back a large number of migrations");
            }
            MigrateCommandHandler::new(settings)
                .execute(dry_run, rollback)
                .await?;
            Ok(())
        }
    }
}

const LARGE_ROLLBACK: u32 = 50;

fn warn_on_privileged_port(host: &str, port: u16) {
    if port < 1024 {
        tracing::warn!(
            host,
            port,
            "Binding to a port below 1024 usually requires elevated privileges"
        );
    }
}
