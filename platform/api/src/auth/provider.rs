use reqwest::{StatusCode, Url};
use uuid::Uuid;

use super::{AuthError, TokenVerifier, UserIdentity};
use crate::config::ProviderConfig;

#[derive(serde::Deserialize)]
struct ProviderUser {
	id: Uuid,
	#[serde(default)]
	email: Option<String>,
}

/// Resolves tokens by asking the identity provider's user endpoint.
#[derive(Debug, Clone)]
pub struct ProviderVerifier {
	client: reqwest::Client,
	user_url: Url,
	api_key: String,
}

impl ProviderVerifier {
	pub fn new(config: &ProviderConfig) -> anyhow::Result<Self> {
		let user_url = Url::parse(&format!("{}/auth/v1/user", config.url.trim_end_matches('/')))?;

		Ok(Self {
			client: reqwest::Client::new(),
			user_url,
			api_key: config.api_key.clone(),
		})
	}
}

#[async_trait::async_trait]
impl TokenVerifier for ProviderVerifier {
	async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
		let mut request = self.client.get(self.user_url.clone()).bearer_auth(token);
		if !self.api_key.is_empty() {
			request = request.header("apikey", &self.api_key);
		}

		let resp = request
			.send()
			.await
			.map_err(|err| AuthError::ProviderUnavailable(err.to_string()))?;

		match resp.status() {
			status if status.is_success() => {
				let user: ProviderUser = resp
					.json()
					.await
					.map_err(|err| AuthError::ProviderUnavailable(format!("invalid user response: {err}")))?;

				Ok(UserIdentity {
					id: user.id,
					email: user.email.filter(|email| !email.is_empty()),
				})
			}
			StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::Rejected),
			status => Err(AuthError::ProviderUnavailable(format!("unexpected status {status}"))),
		}
	}
}
