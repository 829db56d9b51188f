use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;
use uuid::Uuid;

use super::{AuthError, TokenVerifier, UserIdentity};
use crate::config::JwtConfig;

/// Verifies HS256 tokens signed with the identity provider's shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
	key: Hmac<Sha256>,
	issuer: Option<String>,
	audience: Option<String>,
}

impl std::fmt::Debug for JwtVerifier {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("JwtVerifier")
			.field("issuer", &self.issuer)
			.field("audience", &self.audience)
			.finish_non_exhaustive()
	}
}

fn timestamp(secs: u64) -> Option<DateTime<Utc>> {
	Utc.timestamp_opt(secs as i64, 0).single()
}

impl JwtVerifier {
	pub fn new(config: &JwtConfig) -> Result<Self, hmac::digest::InvalidLength> {
		Ok(Self {
			key: Hmac::new_from_slice(config.secret.as_bytes())?,
			issuer: config.issuer.clone(),
			audience: config.audience.clone(),
		})
	}

	/// Signs `claims`, filling in the configured issuer and audience and the
	/// issue time when they are missing.
	pub fn sign_claims(&self, mut claims: Claims) -> Option<String> {
		if claims.registered.issuer.is_none() {
			claims.registered.issuer = self.issuer.clone();
		}

		if claims.registered.audience.is_none() {
			claims.registered.audience = self.audience.clone();
		}

		if claims.registered.issued_at.is_none() {
			claims.registered.issued_at = Some(Utc::now().timestamp() as u64);
		}

		claims.sign_with_key(&self.key).ok()
	}

	pub fn sign(&self, identity: &UserIdentity, expires_at: DateTime<Utc>) -> Option<String> {
		let mut claims = Claims {
			registered: RegisteredClaims {
				subject: Some(identity.id.to_string()),
				expiration: Some(expires_at.timestamp() as u64),
				..Default::default()
			},
			private: Default::default(),
		};

		if let Some(email) = &identity.email {
			claims.private.insert("email".to_string(), email.clone().into());
		}

		self.sign_claims(claims)
	}

	fn verify_sync(&self, token: &str) -> Result<UserIdentity, AuthError> {
		let token: Token<Header, Claims, _> = token
			.verify_with_key(&self.key)
			.map_err(|_| AuthError::InvalidToken("malformed token or bad signature"))?;

		let claims = token.claims();
		let now = Utc::now();

		if self.issuer.is_some() && claims.registered.issuer != self.issuer {
			return Err(AuthError::InvalidToken("issuer mismatch"));
		}

		if self.audience.is_some() && claims.registered.audience != self.audience {
			return Err(AuthError::InvalidToken("audience mismatch"));
		}

		if let Some(iat) = claims.registered.issued_at {
			if timestamp(iat).ok_or(AuthError::InvalidToken("iat"))? > now {
				return Err(AuthError::InvalidToken("issued in the future"));
			}
		}

		if let Some(nbf) = claims.registered.not_before {
			if timestamp(nbf).ok_or(AuthError::InvalidToken("nbf"))? > now {
				return Err(AuthError::InvalidToken("not yet valid"));
			}
		}

		let exp = claims
			.registered
			.expiration
			.and_then(timestamp)
			.ok_or(AuthError::InvalidToken("missing expiration"))?;
		if exp < now {
			return Err(AuthError::Expired);
		}

		let id = claims
			.registered
			.subject
			.as_deref()
			.and_then(|sub| Uuid::parse_str(sub).ok())
			.ok_or(AuthError::InvalidToken("subject is not a user id"))?;

		let email = claims
			.private
			.get("email")
			.and_then(|email| email.as_str())
			.filter(|email| !email.is_empty())
			.map(ToOwned::to_owned);

		Ok(UserIdentity { id, email })
	}
}

#[async_trait::async_trait]
impl TokenVerifier for JwtVerifier {
	async fn verify(&self, token: &str) -> Result<UserIdentity, AuthError> {
		self.verify_sync(token)
	}
}
