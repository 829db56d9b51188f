use platform_api::database::NameRecord;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::ClientError;

/// Talks to the names api on behalf of one signed in user.
pub struct ApiClient {
	http: reqwest::Client,
	endpoint: String,
	token: String,
}

impl ApiClient {
	pub fn new(http: reqwest::Client, endpoint: &str, token: &str) -> Self {
		Self {
			http,
			endpoint: endpoint.trim_end_matches('/').to_string(),
			token: token.to_string(),
		}
	}

	pub async fn save_name(&self, name: &str) -> Result<NameRecord, ClientError> {
		let resp = self
			.http
			.post(format!("{}/api/saveName", self.endpoint))
			.bearer_auth(&self.token)
			.json(&json!({ "name": name }))
			.send()
			.await?;

		decode(resp).await
	}

	pub async fn get_names(&self) -> Result<Vec<NameRecord>, ClientError> {
		let resp = self
			.http
			.get(format!("{}/api/getNames", self.endpoint))
			.bearer_auth(&self.token)
			.send()
			.await?;

		decode(resp).await
	}
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
	let status = resp.status();

	if !status.is_success() {
		let body = resp.text().await?;
		return Err(ClientError::from_response(status, &body));
	}

	Ok(resp.json().await?)
}
