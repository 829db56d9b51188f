use serde::Deserialize;
use serial_test::serial;

use crate::config::{env_table, parse, ConfigError, ConfigFile, DatabaseConfig, LoggingConfig};
use crate::logging::Mode;

fn clear_env() {
	for (key, _) in std::env::vars() {
		if key.starts_with("TEST_") {
			std::env::remove_var(key);
		}
	}
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
struct Config {
	name: String,
	logging: LoggingConfig,
	database: DatabaseConfig,
}

#[serial]
#[test]
fn test_parse_defaults() {
	clear_env();

	let (config, path): (Config, _) = parse("TEST", ConfigFile::None).expect("failed to parse config");
	assert_eq!(config, Config::default());
	assert_eq!(path, None);
}

#[serial]
#[test]
fn test_parse_file() {
	clear_env();

	let tmp_dir = tempfile::tempdir().expect("failed to create temp dir");
	let config_file = tmp_dir.path().join("config.toml");

	std::fs::write(
		&config_file,
		r#"
name = "names"

[logging]
level = "platform_api=debug"
mode = "json"

[database]
uri = "postgres://postgres@localhost:5433/names"
"#,
	)
	.expect("failed to write config file");

	let (config, path): (Config, _) = parse(
		"TEST",
		ConfigFile::Explicit(config_file.to_str().expect("failed to get config path").to_string()),
	)
	.expect("failed to parse config");

	assert_eq!(config.name, "names");
	assert_eq!(config.logging.level, "platform_api=debug");
	assert_eq!(config.logging.mode, Mode::Json);
	assert_eq!(config.database.uri, "postgres://postgres@localhost:5433/names");
	// untouched keys keep their defaults
	assert_eq!(config.database.max_connections, 10);
	assert_eq!(
		path,
		Some(
			std::fs::canonicalize(config_file)
				.expect("failed to canonicalize")
				.display()
				.to_string()
		)
	);
}

#[serial]
#[test]
fn test_parse_env_overrides_file() {
	clear_env();

	let tmp_dir = tempfile::tempdir().expect("failed to create temp dir");
	let config_file = tmp_dir.path().join("config.toml");

	std::fs::write(
		&config_file,
		r#"
[database]
uri = "postgres://from-file"
migrate = true
"#,
	)
	.expect("failed to write config file");

	std::env::set_var("TEST_DATABASE__URI", "postgres://from-env");
	std::env::set_var("TEST_DATABASE__MIGRATE", "false");
	std::env::set_var("TEST_DATABASE__MAX_CONNECTIONS", "3");

	let (config, _): (Config, _) = parse(
		"TEST",
		ConfigFile::Explicit(config_file.to_str().expect("failed to get config path").to_string()),
	)
	.expect("failed to parse config");

	clear_env();

	assert_eq!(config.database.uri, "postgres://from-env");
	assert!(!config.database.migrate);
	assert_eq!(config.database.max_connections, 3);
}

#[serial]
#[test]
fn test_missing_default_file_is_skipped() {
	clear_env();

	let (config, path): (Config, _) =
		parse("TEST", ConfigFile::Default("does-not-exist.toml".to_string())).expect("failed to parse config");
	assert_eq!(config, Config::default());
	assert_eq!(path, None);
}

#[serial]
#[test]
fn test_missing_explicit_file_fails() {
	clear_env();

	let err = parse::<Config>("TEST", ConfigFile::Explicit("does-not-exist.toml".to_string()))
		.expect_err("explicit file must exist");
	assert!(matches!(err, ConfigError::Io { .. }));
	assert_eq!(err.to_string(), "failed to read config file does-not-exist.toml");
	assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_env_table_literals() {
	let table = env_table(
		"test",
		vec![
			("TEST_API__BIND_ADDRESS".to_string(), "0.0.0.0:4000".to_string()),
			("TEST_API__ENABLED".to_string(), "true".to_string()),
			("TEST_NAME".to_string(), "names".to_string()),
			("OTHER_NAME".to_string(), "ignored".to_string()),
		],
	)
	.expect("failed to build table");

	let api = table["api"].as_table().expect("api should be a table");
	assert_eq!(api["bind_address"].as_str(), Some("0.0.0.0:4000"));
	assert_eq!(api["enabled"].as_bool(), Some(true));
	assert_eq!(table["name"].as_str(), Some("names"));
	assert!(!table.contains_key("other_name"));
}

#[test]
fn test_env_table_conflict() {
	let err = env_table(
		"TEST",
		vec![
			("TEST_API".to_string(), "1".to_string()),
			("TEST_API__PORT".to_string(), "2".to_string()),
		],
	)
	.expect_err("scalar and table under the same key");
	assert!(matches!(err, ConfigError::EnvConflict(_)));
}
