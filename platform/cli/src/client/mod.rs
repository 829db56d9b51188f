use anyhow::Context as _;
use reqwest::StatusCode;

pub use self::api::ApiClient;
pub use self::generator::GenerationClient;
use crate::cli::Cli;

mod api;
pub mod generator;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
	#[error("request failed")]
	Http(#[from] reqwest::Error),
	#[error("{status}: {message}")]
	Status { status: StatusCode, message: String },
	#[error("the generator returned an empty suggestion")]
	EmptySuggestion,
}

impl ClientError {
	/// Builds a status error, preferring the `error` field of a json body.
	pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
		let message = serde_json::from_str::<serde_json::Value>(body)
			.ok()
			.and_then(|value| value.get("error").and_then(|e| e.as_str()).map(ToOwned::to_owned))
			.unwrap_or_else(|| body.trim().to_string());

		Self::Status { status, message }
	}
}

#[derive(Debug, serde::Serialize)]
pub struct Suggestion {
	pub name: String,
}

pub struct Client {
	api: Option<ApiClient>,
	generator: Option<GenerationClient>,
	json_output: bool,
}

#[derive(serde::Serialize)]
struct DisplayOutput<T> {
	#[serde(rename = "__type")]
	object_type: &'static str,
	#[serde(flatten)]
	value: T,
}

impl Client {
	pub fn new(args: &Cli) -> anyhow::Result<Self> {
		let http = reqwest::Client::builder()
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()
			.context("failed to build http client")?;

		Ok(Self {
			api: args
				.token
				.as_ref()
				.map(|token| ApiClient::new(http.clone(), &args.endpoint, token)),
			generator: args
				.generator_url
				.as_ref()
				.map(|url| GenerationClient::new(http.clone(), url, args.generator_key.clone())),
			json_output: args.json,
		})
	}

	pub fn api(&self) -> anyhow::Result<&ApiClient> {
		self.api
			.as_ref()
			.context("an access token is required, pass --token or set NAMES_ACCESS_TOKEN")
	}

	pub fn generator(&self) -> anyhow::Result<&GenerationClient> {
		self.generator
			.as_ref()
			.context("a generator url is required, pass --generator-url or set NAMES_GENERATOR_URL")
	}

	pub fn display<T: serde::Serialize>(&self, value: &T) -> anyhow::Result<()> {
		let object_type = std::any::type_name::<T>();
		let object_type = object_type.split("::").last().unwrap_or(object_type);

		let output = if self.json_output {
			serde_json::to_string_pretty(&DisplayOutput { object_type, value }).context("failed to display response")?
		} else {
			serde_yaml::to_string(&DisplayOutput { object_type, value }).context("failed to display response")?
		};

		println!("{}", output.trim());

		Ok(())
	}

	pub fn display_array<T: serde::Serialize>(&self, values: &[T]) -> anyhow::Result<()> {
		let object_type = std::any::type_name::<T>();
		let object_type = object_type.split("::").last().unwrap_or(object_type);

		let values = &values
			.iter()
			.map(|value| DisplayOutput { object_type, value })
			.collect::<Vec<_>>();

		let output = if self.json_output {
			serde_json::to_string_pretty(&values).context("failed to display response")?
		} else {
			serde_yaml::to_string(&values).context("failed to display response")?
		};

		println!("{}", output.trim());

		Ok(())
	}
}
