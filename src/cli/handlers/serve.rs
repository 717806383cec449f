//! `serve` command: dry-run validation or a full server start.

use crate::config::Environment;
use crate::config::settings::Settings;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
    environment: Environment,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, environment: Environment) -> Self {
        Self {
            config,
            environment,
        }
    }

    /// Runs the server until shutdown, or only validates when `dry_run`.
    pub async fn execute(self, dry_run: bool) -> anyhow::Result<()> {
        if dry_run {
            return self.validate_only();
        }
        Server::new(self.config, self.environment).run().await
    }

    /// Validates the merged configuration and prints what would be started.
    pub fn validate_only(&self) -> anyhow::Result<()> {
        self.config.validate()?;
        self.config.logger.clone().into_logger_config()?;

        println!("✓ Configuration is valid ({})", self.environment.as_str());
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Database pool: {}-{} connections, auto_migrate = {}",
            self.config.database.min_connections,
            self.config.database.max_connections,
            self.config.database.auto_migrate
        );
        println!(
            "✓ Access tokens expire after {} hour(s)",
            self.config.jwt.access_token_expiration
        );
        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/eventease_test".to_string();
        config.jwt.secret = "serve-handler-test-secret-0123456789abcdef".to_string();
        config
    }

    #[tokio::test]
    async fn test_dry_run_succeeds_without_database() {
        let handler = ServeCommandHandler::new(valid_config(), Environment::Test);
        assert_eq!(handler.config(), &valid_config());
        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_dry_run_rejects_invalid_config() {
        let mut config = valid_config();
        config.server.port = 0;
        let handler = ServeCommandHandler::new(config, Environment::Test);
        assert!(handler.execute(true).await.is_err());
    }

    #[test]
    fn test_dry_run_rejects_unknown_log_format() {
        let mut config = valid_config();
        config.logger.file.format = "xml".to_string();
        assert!(ServeCommandHandler::new(config, Environment::Test).validate_only().is_err());
    }
}
