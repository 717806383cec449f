//! Applies command-line overrides on top of file and environment configuration.
//!
//! Precedence, lowest first: TOML files, `EVENTEASE_*` variables, flags.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, settings::Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
    environment: Environment,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings, environment: Environment) -> Self {
        Self {
            base_config,
            environment,
        }
    }

    /// Loads the unvalidated base configuration the flags select.
    ///
    /// `--config` reads exactly that file; otherwise the layered `config/`
    /// directory is used. `--env` replaces `EVENTEASE_APP_ENV` in both cases.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let loader = match cli.config {
            Some(ref path) => {
                let environment = cli.env.map(Environment::from).unwrap_or_else(Environment::from_env);
                ConfigLoader::from_file(path, environment)
            }
            None => {
                let loader = ConfigLoader::new()?;
                match cli.env {
                    Some(env) => loader.with_environment(env.into()),
                    None => loader,
                }
            }
        };

        let base_config = loader.load_unvalidated()?;
        Ok(Self::new(base_config, loader.environment()))
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the base settings with every override applied, validated.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            ..
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn base() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/eventease".to_string();
        settings.jwt.secret = "merger-test-secret-long-enough-0123456789".to_string();
        settings
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(base(), Environment::Test).merge_cli_args(&cli)
    }

    #[test]
    fn test_no_flags_keep_base() {
        assert_eq!(merge(&["eventease"]).unwrap(), base());
    }

    #[test]
    fn test_serve_overrides() {
        let settings = merge(&[
            "eventease", "serve", "--host", "0.0.0.0", "--port", "9090", "--log-level", "trace",
        ])
        .unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.logger.level, "trace");
    }

    #[test]
    fn test_log_level_beats_verbose() {
        assert_eq!(merge(&["eventease", "-v"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["eventease", "-q"]).unwrap().logger.level, "error");
        let settings = merge(&["eventease", "-v", "serve", "--log-level", "warn"]).unwrap();
        assert_eq!(settings.logger.level, "warn");
    }

    #[test]
    fn test_migrate_ignores_server_settings() {
        let settings = merge(&["eventease", "migrate", "--dry-run"]).unwrap();
        assert_eq!(settings.server, base().server);
    }

    #[test]
    fn test_merged_settings_are_validated() {
        let cli = Cli::try_parse_from(["eventease"]).unwrap();
        let mut invalid = base();
        invalid.jwt.secret = "short".to_string();
        let err = ConfigurationMerger::new(invalid, Environment::Test)
            .merge_cli_args(&cli)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "jwt.secret"));
    }
}
