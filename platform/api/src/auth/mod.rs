use std::sync::Arc;

use anyhow::Context as _;
use hyper::header::{self, HeaderMap};
use uuid::Uuid;

use crate::config::{AuthConfig, AuthMode};

mod jwt;
mod provider;

pub use self::jwt::JwtVerifier;
pub use self::provider::ProviderVerifier;

/// The caller a bearer token resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
	pub id: Uuid,
	pub email: Option<String>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("missing authorization header")]
	MissingToken,
	#[error("authorization header must be visible ascii")]
	HeaderToStr,
	#[error("authorization header must be a bearer token")]
	NotBearerToken,
	#[error("invalid token: {0}")]
	InvalidToken(&'static str),
	#[error("token expired")]
	Expired,
	#[error("token rejected by identity provider")]
	Rejected,
	#[error("identity provider unavailable: {0}")]
	ProviderUnavailable(String),
}

impl AuthError {
	/// Whether the caller is at fault. Everything except an unreachable
	/// identity provider is.
	pub fn is_unauthorized(&self) -> bool {
		!matches!(self, Self::ProviderUnavailable(_))
	}
}

#[async_trait::async_trait]
pub trait TokenVerifier: Send + Sync {
	async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError>;
}

pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
	let header = headers.get(header::AUTHORIZATION).ok_or(AuthError::MissingToken)?;

	let (scheme, token) = header
		.to_str()
		.map_err(|_| AuthError::HeaderToStr)?
		.split_once(' ')
		.ok_or(AuthError::NotBearerToken)?;

	// The scheme name is case insensitive
	let token = token.trim();
	if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
		return Err(AuthError::NotBearerToken);
	}

	Ok(token)
}

pub fn verifier_from_config(config: &AuthConfig) -> anyhow::Result<Arc<dyn TokenVerifier>> {
	Ok(match config.mode {
		AuthMode::Jwt => {
			if config.jwt.secret.is_empty() {
				anyhow::bail!("auth.jwt.secret must be set");
			}

			Arc::new(JwtVerifier::new(&config.jwt).map_err(|_| anyhow::anyhow!("invalid jwt secret"))?)
		}
		AuthMode::Provider => {
			Arc::new(ProviderVerifier::new(&config.provider).context("failed to create provider verifier")?)
		}
	})
}
