//! Unit tests for database configuration resolution
//!
//! Covers:
//! - Priority order: command line > environment > secrets file
//! - Fail-fast on any missing setting
//! - Secrets file errors
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Every test here touches LYRA_* variables and is marked #[serial].

use lyra_common::config::{
    DbConfig, DbOverrides, ENV_DB_HOST, ENV_DB_NAME, ENV_DB_PASSWORD, ENV_DB_PORT, ENV_DB_USER,
    ENV_SECRETS_FILE,
};
use lyra_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const ALL_VARS: [&str; 6] = [
    ENV_DB_HOST,
    ENV_DB_PORT,
    ENV_DB_NAME,
    ENV_DB_USER,
    ENV_DB_PASSWORD,
    ENV_SECRETS_FILE,
];

fn clear_env() {
    for var in ALL_VARS {
        env::remove_var(var);
    }
}

fn set_full_env() {
    env::set_var(ENV_DB_HOST, "env-host");
    env::set_var(ENV_DB_PORT, "5432");
    env::set_var(ENV_DB_NAME, "env-db");
    env::set_var(ENV_DB_USER, "env-user");
    env::set_var(ENV_DB_PASSWORD, "env-pass");
}

fn secrets_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Should create temp file");
    file.write_all(content.as_bytes())
        .expect("Should write secrets");
    file
}

#[test]
#[serial]
fn test_resolves_from_environment() {
    clear_env();
    set_full_env();

    let config = DbConfig::resolve(&DbOverrides::default()).unwrap();
    assert_eq!(config.host, "env-host");
    assert_eq!(config.port, 5432);
    assert_eq!(config.database, "env-db");
    assert_eq!(config.user, "env-user");
    assert_eq!(config.password, "env-pass");

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_environment() {
    clear_env();
    set_full_env();

    let overrides = DbOverrides {
        host: Some("cli-host".to_string()),
        port: Some("6543".to_string()),
        ..Default::default()
    };
    let config = DbConfig::resolve(&overrides).unwrap();
    assert_eq!(config.host, "cli-host");
    assert_eq!(config.port, 6543);
    assert_eq!(config.user, "env-user");

    clear_env();
}

#[test]
#[serial]
fn test_missing_variable_fails_fast() {
    clear_env();
    set_full_env();
    env::remove_var(ENV_DB_PASSWORD);

    let err = DbConfig::resolve(&DbOverrides::default()).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains(ENV_DB_PASSWORD), "message: {}", msg),
        other => panic!("expected config error, got {:?}", other),
    }

    clear_env();
}

#[test]
#[serial]
fn test_empty_variable_counts_as_missing() {
    clear_env();
    set_full_env();
    env::set_var(ENV_DB_HOST, "");

    assert!(DbConfig::resolve(&DbOverrides::default()).is_err());

    clear_env();
}

#[test]
#[serial]
fn test_secrets_file_fills_gaps() {
    clear_env();
    env::set_var(ENV_DB_HOST, "env-host");

    let file = secrets_file(
        r#"
host = "file-host"
port = 5433
database = "projects"
user = "reader"
password = "s3cret"
"#,
    );
    let overrides = DbOverrides {
        secrets_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };

    let config = DbConfig::resolve(&overrides).unwrap();
    // Environment wins over the file
    assert_eq!(config.host, "env-host");
    assert_eq!(config.port, 5433);
    assert_eq!(config.database, "projects");
    assert_eq!(config.password, "s3cret");

    clear_env();
}

#[test]
#[serial]
fn test_secrets_file_from_environment_variable() {
    clear_env();
    let file = secrets_file(
        r#"
host = "file-host"
port = "5434"
database = "projects"
user = "reader"
password = "s3cret"
"#,
    );
    env::set_var(ENV_SECRETS_FILE, file.path());

    let config = DbConfig::resolve(&DbOverrides::default()).unwrap();
    assert_eq!(config.host, "file-host");
    assert_eq!(config.port, 5434);

    clear_env();
}

#[test]
#[serial]
fn test_missing_secrets_file_fails() {
    clear_env();
    set_full_env();

    let overrides = DbOverrides {
        secrets_file: Some("/nonexistent/lyra/secrets.toml".into()),
        ..Default::default()
    };
    let err = DbConfig::resolve(&overrides).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    clear_env();
}

#[test]
#[serial]
fn test_malformed_secrets_file_fails() {
    clear_env();
    let file = secrets_file("host = [unterminated");
    let overrides = DbOverrides {
        secrets_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(
        DbConfig::resolve(&overrides),
        Err(Error::Config(_))
    ));

    clear_env();
}

#[test]
#[serial]
fn test_secrets_file_wrong_value_type_fails() {
    clear_env();
    let file = secrets_file(
        r#"
host = "file-host"
port = 5433
database = "projects"
user = ["reader"]
password = "s3cret"
"#,
    );
    let overrides = DbOverrides {
        secrets_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(
        DbConfig::resolve(&overrides),
        Err(Error::Config(_))
    ));

    clear_env();
}
