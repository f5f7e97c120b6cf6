//! Application configuration loaded from environment variables.

use std::env;

use crate::auth::{AuthSettings, UserDirectory, UserEntryError};

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8000;
    pub const DEV_ENVIRONMENTS: &str = "default";
    pub const ALLOW_ANONYMOUS_POST: bool = true;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Submission authorization settings
    pub auth: AuthSettings,
    /// Accounts allowed to submit results with HTTP Basic credentials
    pub users: UserDirectory,
    /// Benchmark environments results may be recorded against
    pub environments: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `CODESPEED_HOST`: Server host (default: 127.0.0.1)
    /// - `CODESPEED_PORT`: Server port (default: 8000)
    /// - `CODESPEED_ALLOW_ANONYMOUS_POST`: Accept unauthenticated submissions (default: true)
    /// - `CODESPEED_REQUIRE_SECURE_AUTH`: Refuse credentials over plain HTTP
    ///   (default: false in development, true in production)
    /// - `CODESPEED_USERS`: Comma separated `name:sha256hex[:inactive]` entries
    /// - `CODESPEED_ENVIRONMENTS`: Comma separated environment names
    ///   (default in development: `default`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let host = env::var("CODESPEED_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("CODESPEED_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("CODESPEED_PORT must be a valid port number"))?;

        let allow_anonymous_post = match env::var("CODESPEED_ALLOW_ANONYMOUS_POST") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue(
                "CODESPEED_ALLOW_ANONYMOUS_POST must be true or false",
            ))?,
            Err(_) => defaults::ALLOW_ANONYMOUS_POST,
        };

        let require_secure_auth = match env::var("CODESPEED_REQUIRE_SECURE_AUTH") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue(
                "CODESPEED_REQUIRE_SECURE_AUTH must be true or false",
            ))?,
            Err(_) => environment.is_production(),
        };

        let users = match env::var("CODESPEED_USERS") {
            Ok(v) => UserDirectory::parse(&v)?,
            Err(_) => UserDirectory::default(),
        };

        let environments = env::var("CODESPEED_ENVIRONMENTS")
            .ok()
            .or_else(|| {
                environment
                    .is_development()
                    .then(|| defaults::DEV_ENVIRONMENTS.to_string())
            })
            .map(|v| parse_list(&v))
            .unwrap_or_default();

        let config = Config {
            environment,
            host,
            port,
            auth: AuthSettings {
                allow_anonymous_post,
                require_secure_auth,
            },
            users,
            environments,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that a production configuration can actually accept results.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if !self.auth.allow_anonymous_post && self.users.active_count() == 0 {
            errors.push(
                "CODESPEED_ALLOW_ANONYMOUS_POST is false and CODESPEED_USERS has no active user. \
                 Nobody could submit results."
                    .to_string(),
            );
        }

        if self.environments.is_empty() {
            errors.push(
                "CODESPEED_ENVIRONMENTS is empty. Every result needs a known environment."
                    .to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid CODESPEED_USERS entry: {0}")]
    Users(#[from] UserEntryError),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
