//! `migrate` command: apply, preview or revert embedded migrations.

use crate::config::settings::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// # Errors
    /// - Invalid database settings or zero rollback steps
    /// - Connection or migration failures
    pub async fn execute(&self, dry_run: bool, rollback: Option<u32>) -> AppResult<()> {
        self.config.database.validate()?;

        if rollback == Some(0) {
            return Err(AppError::Validation {
                field: "rollback_steps".to_string(),
                reason: "Number of rollback steps must be greater than 0".to_string(),
            });
        }

        match (dry_run, rollback) {
            (true, _) => self.show_pending().await,
            (false, Some(steps)) => self.rollback(steps).await,
            (false, None) => self.apply().await,
        }
    }

    async fn show_pending(&self) -> AppResult<()> {
        println!("Checking for pending migrations...");
        let pending = self.blocking(pending_migrations).await?;

        if pending.is_empty() {
            println!("✓ No pending migrations - database is up to date");
        } else {
            println!("Found {} pending migration(s):", pending.len());
            for name in &pending {
                println!("  - {}", name);
            }
            println!("\nRun without --dry-run to apply them");
        }
        Ok(())
    }

    async fn apply(&self) -> AppResult<()> {
        println!("Running database migrations...");
        let applied = self.blocking(run_pending_migrations).await?;

        if applied.is_empty() {
            println!("✓ No migrations to apply - database is already up to date");
        } else {
            println!("✓ Applied {} migration(s):", applied.len());
            for version in &applied {
                println!("  - {}", version);
            }
        }
        tracing::info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    async fn rollback(&self, steps: u32) -> AppResult<()> {
        println!("Rolling back {} migration(s)...", steps);
        let reverted = self
            .blocking(move |url: &str| revert_migrations(url, steps))
            .await?;

        if reverted.len() < steps as usize {
            println!(
                "Only {} migration(s) were applied; reverted all of them",
                reverted.len()
            );
        }
        for version in &reverted {
            println!("  - reverted {}", version);
        }
        println!("✓ Rolled back {} migration(s)", reverted.len());
        tracing::info!(requested = steps, reverted = reverted.len(), "Migrations reverted");
        Ok(())
    }

    /// Runs a synchronous migration helper off the async runtime.
    async fn blocking<F>(&self, f: F) -> AppResult<Vec<String>>
    where
        F: FnOnce(&str) -> AppResult<Vec<String>> + Send + 'static,
    {
        let url = self.config.database.url.clone();
        tokio::task::spawn_blocking(move || f(&url))
            .await
            .map_err(|e| AppError::Internal {
                source: anyhow::Error::from(e),
            })?
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
        config
    }

    #[test]
    fn test_new_keeps_config() {
        let handler = MigrateCommandHandler::new(valid_config());
        assert_eq!(handler.config(), &valid_config());
    }

    #[tokio::test]
    async fn test_zero_rollback_steps() {
        let handler = MigrateCommandHandler::new(valid_config());
        match handler.execute(false, Some(0)).await {
            Err(AppError::Validation { field, reason }) => {
                assert_eq!(field, "rollback_steps");
                assert!(reason.contains("greater than 0"));
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_database_url_fails_before_connecting() {
        let mut config = valid_config();
        config.database.url = "mysql://localhost/eventease".to_string();
        let result = MigrateCommandHandler::new(config).execute(true, None).await;
        assert!(result.is_err());
    }
}
