use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use toml::value::Table;
use toml::Value;

use crate::logging;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TlsConfig {
	/// The path to the TLS certificate
	pub cert: String,

	/// The path to the TLS private key
	pub key: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// The log level to use, this is a tracing env filter
	pub level: String,

	/// What logging mode we should use
	pub mode: logging::Mode,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			mode: logging::Mode::Default,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
	/// The database URL to use
	pub uri: String,

	/// Upper bound on pooled connections
	pub max_connections: u32,

	/// Apply pending migrations on start up
	pub migrate: bool,
}

impl Default for DatabaseConfig {
	fn default() -> Self {
		Self {
			uri: "postgres://localhost:5432".to_string(),
			max_connections: 10,
			migrate: true,
		}
	}
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("failed to read config file {path}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config file {path}")]
	File {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},
	#[error("environment variable {0} conflicts with another key")]
	EnvConflict(String),
	#[error("invalid config")]
	Invalid(#[from] toml::de::Error),
}

/// Where a config file comes from. An explicit file must exist, the default
/// location is allowed to be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFile {
	Explicit(String),
	Default(String),
	None,
}

/// Layers, lowest priority first: the struct's serde defaults, the TOML file,
/// then `{prefix}_SECTION__KEY` environment variables. A `.env` file in the
/// working directory is loaded into the environment beforehand.
///
/// Returns the config and the canonical path of the file that was read.
pub fn parse<C: DeserializeOwned>(env_prefix: &str, file: ConfigFile) -> Result<(C, Option<String>), ConfigError> {
	dotenvy::dotenv().ok();

	let mut root = Table::new();
	let mut config_path = None;

	let (path, required) = match file {
		ConfigFile::Explicit(path) => (Some(path), true),
		ConfigFile::Default(path) => (Some(path), false),
		ConfigFile::None => (None, false),
	};

	if let Some(path) = path {
		match read_file(Path::new(&path)) {
			Ok(table) => {
				merge(&mut root, table);
				config_path = Some(
					std::fs::canonicalize(&path)
						.map(|p| p.display().to_string())
						.unwrap_or(path),
				);
			}
			Err(ConfigError::Io { source, .. }) if !required && source.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path, "config file not found, skipping");
			}
			Err(err) => return Err(err),
		}
	}

	merge(&mut root, env_table(env_prefix, std::env::vars())?);

	Ok((Value::Table(root).try_into()?, config_path))
}

fn read_file(path: &Path) -> Result<Table, ConfigError> {
	let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
		path: path.to_path_buf(),
		source,
	})?;

	toml::from_str(&contents).map_err(|source| ConfigError::File {
		path: path.to_path_buf(),
		source,
	})
}

/// Builds a table from `{prefix}_A__B=value` pairs. Values are read as TOML
/// literals when they parse as one (`true`, `10`) and as strings otherwise.
pub(crate) fn env_table(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Result<Table, ConfigError> {
	let prefix = format!("{}_", prefix.to_uppercase());
	let mut root = Table::new();

	for (key, raw) in vars {
		let Some(key) = key.strip_prefix(&prefix) else {
			continue;
		};

		let path = key.split("__").map(str::to_lowercase).collect::<Vec<_>>();
		if path.iter().any(String::is_empty) {
			continue;
		}

		let mut table = &mut root;
		for segment in &path[..path.len() - 1] {
			table = match table
				.entry(segment.clone())
				.or_insert_with(|| Value::Table(Table::new()))
			{
				Value::Table(t) => t,
				_ => return Err(ConfigError::EnvConflict(format!("{prefix}{key}"))),
			};
		}

		table.insert(path[path.len() - 1].clone(), literal(&raw));
	}

	Ok(root)
}

fn literal(raw: &str) -> Value {
	toml::from_str::<Table>(&format!("v = {raw}"))
		.ok()
		.and_then(|mut t| t.remove("v"))
		.filter(|v| !v.is_table())
		.unwrap_or_else(|| Value::String(raw.to_string()))
}

fn merge(into: &mut Table, from: Table) {
	for (key, value) in from {
		match value {
			Value::Table(incoming) => match into.get_mut(&key) {
				Some(Value::Table(existing)) => merge(existing, incoming),
				_ => {
					into.insert(key, Value::Table(incoming));
				}
			},
			value => {
				into.insert(key, value);
			}
		}
	}
}
