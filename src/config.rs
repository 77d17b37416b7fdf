//! Application configuration for the dashboard.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Which database backend the dashboard queries.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatabaseBackend {
    /// The production wesnothd database (MariaDB / MySQL protocol).
    #[default]
    Mariadb,
    /// A local SQLite file, used for the bundled sample dataset and tests.
    Sqlite,
}

/// Mapping from the three logical table names to the actual table names in
/// the target database. Instances prefix or rename their tables, so each is
/// configurable; defaults are the logical names themselves.
#[derive(Debug, Clone, Serialize, Deserialize, Getters)]
pub struct TableNames {
    /// Actual name of the game session table.
    #[serde(default = "default_game_info")]
    game_info: String,
    /// Actual name of the per-game content table.
    #[serde(default = "default_game_content_info")]
    game_content_info: String,
    /// Actual name of the per-player table.
    #[serde(default = "default_game_player_info")]
    game_player_info: String,
}

fn default_game_info() -> String {
    "game_info".to_string()
}

fn default_game_content_info() -> String {
    "game_content_info".to_string()
}

fn default_game_player_info() -> String {
    "game_player_info".to_string()
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            game_info: default_game_info(),
            game_content_info: default_game_content_info(),
            game_player_info: default_game_player_info(),
        }
    }
}

/// User-defined configuration options for the dashboard.
///
/// Values are resolved in three layers: built-in defaults, then a TOML config
/// file, then environment variables. A later layer only overrides values it
/// actually sets.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database user.
    #[serde(default)]
    user: Option<String>,

    /// Database password.
    #[serde(default)]
    password: Option<String>,

    /// Database host.
    #[serde(default = "default_host")]
    host: String,

    /// Database port.
    #[serde(default = "default_port")]
    port: u16,

    /// Database name.
    #[serde(default)]
    database: Option<String>,

    /// Database backend to connect to.
    #[serde(default)]
    backend: DatabaseBackend,

    /// Path of the SQLite database file when `backend = "sqlite"`.
    #[serde(default = "default_sqlite_path")]
    sqlite_path: String,

    /// URL prefix the dashboard is served under.
    #[serde(default = "default_url_base_pathname")]
    url_base_pathname: String,

    /// Maximum number of rows a table query may return.
    #[serde(default = "default_query_row_limit")]
    query_row_limit: u32,

    /// Logical-to-actual table name mapping.
    #[serde(default)]
    table_names_map: TableNames,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_sqlite_path() -> String {
    "wesnoth_mp.db".to_string()
}

fn default_url_base_pathname() -> String {
    "/dashboard/".to_string()
}

fn default_query_row_limit() -> u32 {
    5000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            host: default_host(),
            port: default_port(),
            database: None,
            backend: DatabaseBackend::default(),
            sqlite_path: default_sqlite_path(),
            url_base_pathname: default_url_base_pathname(),
            query_row_limit: default_query_row_limit(),
            table_names_map: TableNames::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration for the server: defaults, then the TOML file at
    /// `path` (skipped with a log line if absent), then environment
    /// variables. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is malformed, an environment
    /// variable fails to parse, or validation fails.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            info!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            Self::default()
        };

        let config = config.with_env_overrides()?;
        config.validate()?;
        info!(
            backend = %config.backend,
            host = %config.host,
            port = config.port,
            query_row_limit = config.query_row_limit,
            "Loaded user-defined app configuration options"
        );
        Ok(config)
    }

    /// Parses configuration from a TOML file without applying environment
    /// overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Creates a configuration pointed at a local SQLite file, as produced by
    /// the `init-sample` command.
    pub fn for_sqlite(path: impl Into<String>) -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            sqlite_path: path.into(),
            ..Self::default()
        }
    }

    /// Applies overrides from the process environment (`DB_USER`,
    /// `DB_PASSWORD`, `DB_HOST`, `DB_PORT`, `DB_DATABASE`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DB_PORT` is not a valid port number.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_env_overrides_from(|name| std::env::var(name).ok())
    }

    /// Applies environment-variable overrides using `lookup` as the variable
    /// source. Factored out of [`Self::with_env_overrides`] so the override
    /// logic is testable without touching the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `DB_PORT` is not a valid port number.
    pub fn with_env_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(user) = lookup("DB_USER") {
            self.user = Some(user);
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            self.password = Some(password);
        }
        if let Some(host) = lookup("DB_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            self.port = port
                .parse()
                .map_err(|e| ConfigError::new(format!("Invalid DB_PORT '{}': {}", port, e)))?;
        }
        if let Some(database) = lookup("DB_DATABASE") {
            self.database = Some(database);
        }
        Ok(self)
    }

    /// Validates the configuration. Called at startup so a broken
    /// configuration is fatal before the server binds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if MariaDB credentials are incomplete, a table
    /// name is not a valid SQL identifier, or the URL base path is malformed.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == DatabaseBackend::Mariadb
            && (self.user.is_none() || self.password.is_none() || self.database.is_none())
        {
            return Err(ConfigError::new(
                "MariaDB backend requires user, password, and database to be set",
            ));
        }

        for name in [
            self.table_names_map.game_info(),
            self.table_names_map.game_content_info(),
            self.table_names_map.game_player_info(),
        ] {
            if !is_valid_identifier(name) {
                return Err(ConfigError::new(format!(
                    "Table name '{}' is not a valid SQL identifier",
                    name
                )));
            }
        }

        if !self.url_base_pathname.starts_with('/') {
            return Err(ConfigError::new(format!(
                "url_base_pathname '{}' must start with '/'",
                self.url_base_pathname
            )));
        }

        if self.query_row_limit == 0 {
            return Err(ConfigError::new("query_row_limit must be greater than zero"));
        }

        Ok(())
    }

    /// Builds the connection URL for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if MariaDB credentials are incomplete.
    pub fn connection_url(&self) -> Result<String, ConfigError> {
        match self.backend {
            DatabaseBackend::Sqlite => Ok(self.sqlite_path.clone()),
            DatabaseBackend::Mariadb => {
                let user = self
                    .user
                    .as_deref()
                    .ok_or_else(|| ConfigError::new("Database user is not configured"))?;
                let password = self
                    .password
                    .as_deref()
                    .ok_or_else(|| ConfigError::new("Database password is not configured"))?;
                let database = self
                    .database
                    .as_deref()
                    .ok_or_else(|| ConfigError::new("Database name is not configured"))?;
                Ok(format!(
                    "mysql://{}:{}@{}:{}/{}",
                    user, password, self.host, self.port, database
                ))
            }
        }
    }

    /// Wraps the configuration in an [`Arc`] for sharing across handlers.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// An identifier is interpolated into SQL, so it is restricted to the
/// unquoted-identifier charset of both supported backends.
fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rules() {
        assert!(is_valid_identifier("game_info"));
        assert!(is_valid_identifier("_tmp_wesnothd_game_info"));
        assert!(is_valid_identifier("t$1"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1game"));
        assert!(!is_valid_identifier("game info"));
        assert!(!is_valid_identifier("game;DROP"));
    }
}
