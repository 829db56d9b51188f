use serde_json::json;

use super::ClientError;

pub const PROMPT: &str = "Suggest a unique and meaningful baby name";

/// Calls the text generation service that comes up with names.
pub struct GenerationClient {
	http: reqwest::Client,
	url: String,
	key: Option<String>,
}

impl GenerationClient {
	pub fn new(http: reqwest::Client, url: &str, key: Option<String>) -> Self {
		Self {
			http,
			url: url.to_string(),
			key,
		}
	}

	pub async fn generate(&self) -> Result<String, ClientError> {
		let mut request = self.http.post(&self.url).json(&json!({
			"event_type": "chatgpt_request",
			"data": {
				"prompt": PROMPT,
				"response_type": "text",
			},
		}));

		if let Some(key) = &self.key {
			request = request.bearer_auth(key);
		}

		let resp = request.send().await?;
		let status = resp.status();
		let body = resp.text().await?;

		if !status.is_success() {
			return Err(ClientError::from_response(status, &body));
		}

		parse_suggestion(&body)
	}
}

/// The service answers with plain text or a json string, either way the
/// suggestion is the trimmed text.
pub fn parse_suggestion(body: &str) -> Result<String, ClientError> {
	let body = body.trim();

	let text = match serde_json::from_str::<String>(body) {
		Ok(text) => text,
		Err(_) => body.to_string(),
	};

	let text = text.trim();
	if text.is_empty() {
		return Err(ClientError::EmptySuggestion);
	}

	Ok(text.to_string())
}
