use std::net::SocketAddr;

use anyhow::Result;
use clap::Parser;
use common::config::{ConfigFile, DatabaseConfig, LoggingConfig, TlsConfig};

const ENV_PREFIX: &str = "NAMES";

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Bind address for the API
	pub bind_address: SocketAddr,

	/// If we should use TLS for the API server
	pub tls: Option<TlsConfig>,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			bind_address: "[::]:4000".parse().expect("failed to parse bind address"),
			tls: None,
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
	/// Verify tokens locally with the provider's shared signing secret
	#[default]
	Jwt,
	/// Ask the identity provider who a token belongs to
	Provider,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct JwtConfig {
	/// JWT secret
	pub secret: String,

	/// Required `iss` claim, unchecked when unset
	pub issuer: Option<String>,

	/// Required `aud` claim, unchecked when unset
	pub audience: Option<String>,
}

impl Default for JwtConfig {
	fn default() -> Self {
		Self {
			secret: "names".to_string(),
			issuer: None,
			audience: Some("authenticated".to_string()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
	/// Base URL of the identity provider
	pub url: String,

	/// Public (anon) key sent as the `apikey` header
	pub api_key: String,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			url: "http://localhost:54321".to_string(),
			api_key: String::new(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AuthConfig {
	pub mode: AuthMode,
	pub jwt: JwtConfig,
	pub provider: ProviderConfig,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
	/// Environment tag attached to every report
	pub environment: String,

	/// Project the reports belong to
	pub project_id: Option<String>,
}

impl Default for TelemetryConfig {
	fn default() -> Self {
		Self {
			environment: "development".to_string(),
			project_id: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Config file that was loaded, filled in after parsing
	#[serde(skip)]
	pub config_file: Option<String>,

	/// Name of this instance
	pub name: String,

	/// The logging config
	pub logging: LoggingConfig,

	/// API Config
	pub api: ApiConfig,

	/// Database Config
	pub database: DatabaseConfig,

	/// Token verification
	pub auth: AuthConfig,

	/// Error reporting
	pub telemetry: TelemetryConfig,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			config_file: None,
			name: "names-api".to_string(),
			logging: LoggingConfig::default(),
			api: ApiConfig::default(),
			database: DatabaseConfig {
				uri: "postgres://postgres@localhost:5432/names".to_string(),
				..Default::default()
			},
			auth: AuthConfig::default(),
			telemetry: TelemetryConfig::default(),
		}
	}
}

#[derive(Debug, Parser)]
#[command(name = "platform-api", version, about = "Name suggestion API server")]
struct Cli {
	/// Path to a TOML config file
	#[arg(long, env = "NAMES_CONFIG_FILE")]
	config_file: Option<String>,
}

impl AppConfig {
	/// Reads the command line, then layers the config file and environment.
	pub fn parse() -> Result<Self> {
		let cli = Cli::parse();

		let file = match cli.config_file {
			Some(path) => ConfigFile::Explicit(path),
			None => ConfigFile::Default("config.toml".to_string()),
		};

		Self::load(file)
	}

	pub fn load(file: ConfigFile) -> Result<Self> {
		let (mut config, config_file) = common::config::parse::<Self>(ENV_PREFIX, file)?;
		config.config_file = config_file;
		Ok(config)
	}
}
