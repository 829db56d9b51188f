use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use common::context::{Context, Handler};
use common::logging;
use common::prelude::FutureTimeout;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::auth::{AuthError, JwtVerifier, TokenVerifier, UserIdentity};
use crate::config::{AppConfig, JwtConfig};
use crate::database::MemoryNameStore;
use crate::global::GlobalState;
use crate::telemetry::{error_chain, ErrorReporter, ReportContext};


#[derive(Default)]
pub struct RecordingReporter {
	reports: Mutex<Vec<(String, ReportContext)>>,
}

impl RecordingReporter {
	pub fn reports(&self) -> Vec<(String, ReportContext)> {
		self.reports.lock().unwrap().clone()
	}
}

#[async_trait::async_trait]
impl ErrorReporter for RecordingReporter {
	fn capture(&self, error: &(dyn std::error::Error + 'static), context: &ReportContext) {
		self.reports.lock().unwrap().push((error_chain(error), context.clone()));
	}
}

/// Stands in for an identity provider that cannot be reached.
pub struct UnavailableVerifier;

#[async_trait::async_trait]
impl TokenVerifier for UnavailableVerifier {
	async fn verify(&self, _: &str) -> Result<UserIdentity, AuthError> {
		Err(AuthError::ProviderUnavailable("connection refused".to_string()))
	}
}

pub fn jwt_config() -> JwtConfig {
	JwtConfig {
		secret: "test-secret".to_string(),
		..Default::default()
	}
}

pub fn test_jwt() -> JwtVerifier {
	JwtVerifier::new(&jwt_config()).unwrap()
}

pub struct TestServer {
	pub url: String,
	pub store: Arc<MemoryNameStore>,
	pub reporter: Arc<RecordingReporter>,
	pub jwt: JwtVerifier,
	global: Arc<GlobalState>,
	handler: Handler,
	task: JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
	pub async fn start() -> Self {
		Self::with_verifier(Arc::new(test_jwt())).await
	}

	pub async fn with_verifier(verifier: Arc<dyn TokenVerifier>) -> Self {
		let port = portpicker::pick_unused_port().expect("failed to pick port");

		let mut config = AppConfig::default();
		config.api.bind_address = format!("127.0.0.1:{port}").parse().unwrap();
		config.logging.level = "platform_api=debug".to_string();

		logging::init(&config.logging.level, config.logging.mode).expect("failed to initialize logging");

		let store = Arc::new(MemoryNameStore::new());
		let reporter = Arc::new(RecordingReporter::default());
		let (ctx, handler) = Context::new();

		let global = Arc::new(GlobalState::new(
			ctx,
			config,
			verifier,
			store.clone(),
			reporter.clone(),
		));

		let task = tokio::spawn(crate::api::run(global.clone()));

		// Wait for the listener to come up
		tokio::time::sleep(Duration::from_millis(200)).await;

		Self {
			url: format!("http://127.0.0.1:{port}"),
			store,
			reporter,
			jwt: test_jwt(),
			global,
			handler,
			task,
		}
	}

	pub fn token(&self, user: Uuid) -> String {
		self.jwt
			.sign(
				&UserIdentity {
					id: user,
					email: Some("user@example.com".to_string()),
				},
				Utc::now() + chrono::Duration::hours(1),
			)
			.unwrap()
	}

	pub async fn shutdown(self) {
		drop(self.global);

		self.handler
			.cancel()
			.timeout(Duration::from_secs(1))
			.await
			.expect("failed to cancel context");

		self.task
			.timeout(Duration::from_secs(1))
			.await
			.expect("api did not stop in time")
			.expect("api task panicked")
			.expect("api failed");
	}
}
