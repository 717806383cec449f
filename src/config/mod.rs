//! Layered configuration: TOML files under `config/` overridden by
//! `EVENTEASE_*` environment variables.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, DatabaseConfig, JwtConfig, LoggerSettings, ServerConfig, Settings,
};
