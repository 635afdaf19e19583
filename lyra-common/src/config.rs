//! Database configuration loading
//!
//! Each connection setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Secrets TOML file
//!
//! A setting missing from all three is a startup failure. There are no
//! compiled defaults for credentials.

use crate::{Error, Result};
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_DB_HOST: &str = "LYRA_DB_HOST";
pub const ENV_DB_PORT: &str = "LYRA_DB_PORT";
pub const ENV_DB_NAME: &str = "LYRA_DB_NAME";
pub const ENV_DB_USER: &str = "LYRA_DB_USER";
pub const ENV_DB_PASSWORD: &str = "LYRA_DB_PASSWORD";
pub const ENV_SECRETS_FILE: &str = "LYRA_SECRETS_FILE";

/// Values supplied on the command line. Every field is optional; anything
/// left unset falls through to the environment and then the secrets file.
#[derive(Debug, Clone, Default)]
pub struct DbOverrides {
    pub host: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub secrets_file: Option<PathBuf>,
}

/// Resolved connection settings for the project database
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl DbConfig {
    /// Resolve every setting or fail naming the first one that is missing
    pub fn resolve(overrides: &DbOverrides) -> Result<Self> {
        let secrets_path = overrides
            .secrets_file
            .clone()
            .or_else(|| std::env::var(ENV_SECRETS_FILE).ok().map(PathBuf::from));

        let secrets = match secrets_path {
            Some(path) => Some(load_secrets_file(&path)?),
            None => None,
        };
        let secrets = secrets.as_ref();

        let host = resolve_value(overrides.host.as_deref(), ENV_DB_HOST, secrets, "host")?;
        let port_raw = resolve_value(overrides.port.as_deref(), ENV_DB_PORT, secrets, "port")?;
        let database = resolve_value(overrides.database.as_deref(), ENV_DB_NAME, secrets, "database")?;
        let user = resolve_value(overrides.user.as_deref(), ENV_DB_USER, secrets, "user")?;
        let password =
            resolve_value(overrides.password.as_deref(), ENV_DB_PASSWORD, secrets, "password")?;

        let port = port_raw.trim().parse::<u16>().map_err(|_| {
            Error::Config(format!("Invalid database port '{}' ({})", port_raw, ENV_DB_PORT))
        })?;

        let config = DbConfig {
            host,
            port,
            database,
            user,
            password,
        };
        info!(
            "Database target: {}@{}:{}/{}",
            config.user, config.host, config.port, config.database
        );
        Ok(config)
    }

    /// Build sqlx connection options for this configuration
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

fn resolve_value(
    cli_arg: Option<&str>,
    env_var_name: &str,
    secrets: Option<&toml::Table>,
    secrets_key: &str,
) -> Result<String> {
    // Priority 1: Command-line argument
    if let Some(value) = cli_arg {
        return Ok(value.to_string());
    }

    // Priority 2: Environment variable
    if let Ok(value) = std::env::var(env_var_name) {
        if !value.is_empty() {
            return Ok(value);
        }
    }

    // Priority 3: Secrets file
    if let Some(value) = secrets.and_then(|t| t.get(secrets_key)) {
        let value = match value {
            toml::Value::String(s) => s.clone(),
            toml::Value::Integer(i) => i.to_string(),
            other => {
                return Err(Error::Config(format!(
                    "Secrets file key '{}' must be a string or integer, found {}",
                    secrets_key,
                    other.type_str()
                )))
            }
        };
        debug!("{} resolved from secrets file", secrets_key);
        return Ok(value);
    }

    Err(Error::Config(format!(
        "Missing database {}: set {} or add '{}' to the secrets file",
        secrets_key, env_var_name, secrets_key
    )))
}

/// Read a flat TOML table of connection settings
fn load_secrets_file(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read secrets file {}: {}", path.display(), e))
    })?;
    content.parse::<toml::Table>().map_err(|e| {
        Error::Config(format!("Malformed secrets file {}: {}", path.display(), e))
    })
}
