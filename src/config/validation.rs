//! Semantic checks run after configuration is loaded and merged.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, JwtConfig, LoggerSettings, ServerConfig, Settings,
};

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

const MIN_JWT_SECRET_LEN: usize = 32;

impl ServerConfig {
    /// Port must be non-zero, both timeouts positive and every CORS origin
    /// either `*` or an http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        if let Some(origin) = self
            .cors_allowed_origins
            .iter()
            .find(|o| o.as_str() != "*" && !o.starts_with("http://") && !o.starts_with("https://"))
        {
            return Err(ConfigError::validation(
                "server.cors_allowed_origins",
                format!("Invalid origin '{}'. Use '*' or an http(s) URL.", origin),
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Set database.url or EVENTEASE_DATABASE__URL.",
            ));
        }

        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::validation(
                "database.min_connections",
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::validation(
                "jwt.secret",
                format!(
                    "JWT secret should be at least {} characters for security",
                    MIN_JWT_SECRET_LEN
                ),
            ));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::validation(
                "jwt.access_token_expiration",
                "Access token expiration must be positive",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.file.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        self.file.validate()
    }
}

impl Settings {
    /// Validates every section and returns the first failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.jwt.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ConfigError) -> String {
        match err {
            ConfigError::ValidationError { field, .. } => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.database.url = "postgres://localhost/eventease".to_string();
        settings.jwt.secret = "s".repeat(MIN_JWT_SECRET_LEN);
        settings
    }

    #[test]
    fn test_valid_settings_pass() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_server_rules() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(field_of(config.validate().unwrap_err()), "server.port");

        let config = ServerConfig {
            keep_alive_timeout: 0,
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "server.keep_alive_timeout"
        );

        let config = ServerConfig {
            cors_allowed_origins: vec!["*".to_string(), "ftp://files".to_string()],
            ..Default::default()
        };
        assert_eq!(
            field_of(config.validate().unwrap_err()),
            "server.cors_allowed_origins"
        );

        let config = ServerConfig {
            port: 65535,
            cors_allowed_origins: vec!["*".to_string(), "https://app.example".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_rules() {
        assert_eq!(
            field_of(DatabaseConfig::default().validate().unwrap_err()),
            "database.url"
        );

        let mysql = DatabaseConfig {
            url: "mysql://localhost/db".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(mysql.validate().unwrap_err()), "database.url");

        let inverted = DatabaseConfig {
            url: "postgresql://localhost/db".to_string(),
            max_connections: 2,
            min_connections: 5,
            ..Default::default()
        };
        let err = inverted.validate().unwrap_err();
        assert!(err.to_string().contains("Min connections (5) cannot exceed max connections (2)"));
    }

    #[test]
    fn test_jwt_rules() {
        let mut jwt = JwtConfig::default();
        assert!(jwt.validate().unwrap_err().to_string().contains("cannot be empty"));

        jwt.secret = "short".to_string();
        assert!(jwt.validate().unwrap_err().to_string().contains("at least 32"));

        jwt.secret = "a".repeat(32);
        jwt.access_token_expiration = 0;
        assert_eq!(
            field_of(jwt.validate().unwrap_err()),
            "jwt.access_token_expiration"
        );
    }

    #[test]
    fn test_logger_rules() {
        let mut logger = LoggerSettings {
            level: "VERBOSE".to_string(),
            ..Default::default()
        };
        assert_eq!(field_of(logger.validate().unwrap_err()), "logger.level");

        logger.level = "WARN".to_string();
        logger.file.format = "xml".to_string();
        assert_eq!(field_of(logger.validate().unwrap_err()), "logger.file.format");

        logger.file.format = "Full".to_string();
        logger.file.enabled = true;
        logger.file.path = "  ".to_string();
        assert_eq!(field_of(logger.validate().unwrap_err()), "logger.file.path");
    }

    #[test]
    fn test_settings_reports_first_failing_section() {
        let mut settings = valid_settings();
        settings.jwt.secret.clear();
        settings.logger.level = "nope".to_string();
        assert_eq!(field_of(settings.validate().unwrap_err()), "jwt.secret");
    }
}
