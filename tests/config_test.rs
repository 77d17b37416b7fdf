//! Tests for configuration layering and validation.

use std::io::Write;
use tempfile::NamedTempFile;

use wesnoth_mp_dashboard::{AppConfig, DatabaseBackend};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn test_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 3306);
    assert_eq!(*config.backend(), DatabaseBackend::Mariadb);
    assert_eq!(config.url_base_pathname(), "/dashboard/");
    assert_eq!(*config.query_row_limit(), 5000);
    assert_eq!(config.table_names_map().game_info(), "game_info");
    assert!(config.user().is_none());
}

#[test]
fn test_from_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
user = "dashboard"
password = "hunter2"
database = "wesnothd"
host = "db.wesnoth.org"
query_row_limit = 2500

[table_names_map]
game_info = "tmp_game_info"
"#
    )
    .expect("Write failed");

    let config = AppConfig::from_file(file.path()).expect("Parse failed");
    assert_eq!(config.user().as_deref(), Some("dashboard"));
    assert_eq!(config.host(), "db.wesnoth.org");
    assert_eq!(*config.query_row_limit(), 2500);
    assert_eq!(config.table_names_map().game_info(), "tmp_game_info");
    // Unset entries keep their defaults.
    assert_eq!(*config.port(), 3306);
    assert_eq!(config.table_names_map().game_player_info(), "game_player_info");
}

#[test]
fn test_from_file_malformed() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "query_row_limit = \"lots\"").expect("Write failed");
    assert!(AppConfig::from_file(file.path()).is_err());
}

#[test]
fn test_env_overrides_set_values() {
    let config = AppConfig::default()
        .with_env_overrides_from(|name| match name {
            "DB_USER" => Some("envuser".to_string()),
            "DB_PASSWORD" => Some("envpass".to_string()),
            "DB_HOST" => Some("10.0.0.7".to_string()),
            "DB_PORT" => Some("3307".to_string()),
            "DB_DATABASE" => Some("wesnothd".to_string()),
            _ => None,
        })
        .expect("Overrides failed");

    assert_eq!(config.user().as_deref(), Some("envuser"));
    assert_eq!(config.host(), "10.0.0.7");
    assert_eq!(*config.port(), 3307);
    assert_eq!(config.database().as_deref(), Some("wesnothd"));
}

#[test]
fn test_env_overrides_keep_unset_values() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "user = \"fileuser\"\nhost = \"filehost\"").expect("Write failed");
    let config = AppConfig::from_file(file.path())
        .expect("Parse failed")
        .with_env_overrides_from(no_env)
        .expect("Overrides failed");

    assert_eq!(config.user().as_deref(), Some("fileuser"));
    assert_eq!(config.host(), "filehost");
}

#[test]
fn test_env_override_invalid_port() {
    let result = AppConfig::default().with_env_overrides_from(|name| {
        (name == "DB_PORT").then(|| "not-a-port".to_string())
    });
    assert!(result.is_err());
}

#[test]
fn test_validate_requires_mariadb_credentials() {
    let config = AppConfig::default();
    assert!(config.validate().is_err(), "Missing credentials should fail");

    let config: AppConfig = toml::from_str(
        "user = \"u\"\npassword = \"p\"\ndatabase = \"wesnothd\"",
    )
    .expect("Parse failed");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_sqlite_needs_no_credentials() {
    let config = AppConfig::for_sqlite("games.db");
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_table_name() {
    let config: AppConfig = toml::from_str(
        "backend = \"sqlite\"\n[table_names_map]\ngame_info = \"game_info; DROP TABLE users\"",
    )
    .expect("Parse failed");
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_base_path() {
    let config: AppConfig =
        toml::from_str("backend = \"sqlite\"\nurl_base_pathname = \"dashboard\"")
            .expect("Parse failed");
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_row_limit() {
    let config: AppConfig = toml::from_str("backend = \"sqlite\"\nquery_row_limit = 0")
        .expect("Parse failed");
    assert!(config.validate().is_err());
}

#[test]
fn test_connection_url_sqlite() {
    let config = AppConfig::for_sqlite("games.db");
    assert_eq!(config.connection_url().expect("URL failed"), "games.db");
}

#[test]
fn test_connection_url_mariadb() {
    let config: AppConfig = toml::from_str(
        "user = \"u\"\npassword = \"p\"\ndatabase = \"wesnothd\"\nhost = \"db\"\nport = 3307",
    )
    .expect("Parse failed");
    assert_eq!(
        config.connection_url().expect("URL failed"),
        "mysql://u:p@db:3307/wesnothd"
    );
}

#[test]
fn test_connection_url_mariadb_without_credentials() {
    assert!(AppConfig::default().connection_url().is_err());
}

#[test]
fn test_load_validated_sqlite_file() {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    write!(file, "backend = \"sqlite\"\nsqlite_path = \"games.db\"").expect("Write failed");
    let config = AppConfig::load(file.path()).expect("Load failed");
    assert_eq!(*config.backend(), DatabaseBackend::Sqlite);
}

#[test]
fn test_backend_round_trip() {
    assert_eq!(DatabaseBackend::Mariadb.to_string(), "mariadb");
    assert_eq!(
        "sqlite".parse::<DatabaseBackend>().expect("Parse failed"),
        DatabaseBackend::Sqlite
    );
    assert!("postgres".parse::<DatabaseBackend>().is_err());
}
