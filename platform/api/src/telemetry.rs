use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use crate::config::TelemetryConfig;

/// Where in the request flow an error was captured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportContext {
	pub route: &'static str,
	pub user_id: Option<Uuid>,
}

#[async_trait::async_trait]
pub trait ErrorReporter: Send + Sync {
	fn capture(&self, error: &(dyn std::error::Error + 'static), context: &ReportContext);

	/// Delivers anything still buffered. Called once at shutdown.
	async fn flush(&self) {}
}

/// Joins an error and all of its sources with `: `.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
	let mut chain = error.to_string();
	let mut source = error.source();

	while let Some(err) = source {
		chain.push_str(": ");
		chain.push_str(&err.to_string());
		source = err.source();
	}

	chain
}

/// Emits every captured error as a structured `tracing` event.
pub struct TracingReporter {
	environment: String,
	project_id: Option<String>,
	captured: AtomicU64,
}

impl TracingReporter {
	pub fn new(config: &TelemetryConfig) -> Self {
		Self {
			environment: config.environment.clone(),
			project_id: config.project_id.clone(),
			captured: AtomicU64::new(0),
		}
	}
}

pub fn init(config: &TelemetryConfig) -> Arc<TracingReporter> {
	tracing::info!(environment = %config.environment, project_id = ?config.project_id, "error reporting enabled");
	Arc::new(TracingReporter::new(config))
}

#[async_trait::async_trait]
impl ErrorReporter for TracingReporter {
	fn capture(&self, error: &(dyn std::error::Error + 'static), context: &ReportContext) {
		self.captured.fetch_add(1, Ordering::Relaxed);

		tracing::error!(
			target: "telemetry",
			environment = %self.environment,
			project_id = self.project_id.as_deref().unwrap_or_default(),
			"type" = "backend",
			route = context.route,
			user_id = ?context.user_id,
			error = %error_chain(error),
			"captured exception"
		);
	}

	async fn flush(&self) {
		tracing::info!(captured = self.captured.load(Ordering::Relaxed), "error reporter flushed");
	}
}
