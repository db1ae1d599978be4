use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

use crate::auth::DEFAULT_HASH_COST;
use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub jwt: JwtSettings,
    pub password: PasswordSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on any single user store call
    pub store_timeout_seconds: u64,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_seconds)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> Secret<String> {
        Secret::new(format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database_name
        ))
    }

    /// Server-level connection, for creating databases.
    pub fn connection_string_without_db(&self) -> Secret<String> {
        Secret::new(format!(
            "postgres://{}:{}@{}:{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port
        ))
    }
}

/// JWT signing settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: Secret<String>,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_hours: i64,
}

#[derive(serde::Deserialize, Clone)]
pub struct PasswordSettings {
    /// bcrypt work factor
    pub hash_cost: u32,
}

impl Settings {
    /// Reject settings the service must not start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.jwt.access_token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt.access_token_ttl_hours must be positive".to_string(),
            ));
        }
        if self.jwt.refresh_token_ttl_hours <= self.jwt.access_token_ttl_hours {
            return Err(ConfigError::InvalidValue(
                "jwt.refresh_token_ttl_hours must exceed jwt.access_token_ttl_hours".to_string(),
            ));
        }
        if self.application.store_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue(
                "application.store_timeout_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load settings from `configuration.yaml` (optional) and `APP_`-prefixed
/// environment variables, e.g. `APP_JWT__SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .set_default("application.host", "127.0.0.1")?
        .set_default("application.port", 8000)?
        .set_default("application.store_timeout_seconds", 5)?
        .set_default("jwt.access_token_ttl_hours", 24)?
        .set_default("jwt.refresh_token_ttl_hours", 168)?
        .set_default("password.hash_cost", i64::from(DEFAULT_HASH_COST))?
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
