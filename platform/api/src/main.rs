use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use common::context::Context;
use common::logging;
use common::prelude::FutureTimeout;
use common::signal::SignalHandler;
use platform_api::api;
use platform_api::config::AppConfig;
use platform_api::global::GlobalState;
use platform_api::telemetry::{self, ErrorReporter};
use tokio::select;

#[tokio::main]
async fn main() {
	if let Err(err) = start().await {
		eprintln!("platform-api failed: {err:#}");
		std::process::exit(1);
	}
}

async fn start() -> anyhow::Result<()> {
	let config = AppConfig::parse().context("failed to parse config")?;

	logging::init(&config.logging.level, config.logging.mode).context("failed to initialize logging")?;

	if let Some(file) = &config.config_file {
		tracing::info!(file = file, "loaded config from file");
	}

	tracing::debug!("config: {:#?}", config);

	let reporter = telemetry::init(&config.telemetry);

	let (ctx, handler) = Context::new();

	let global = Arc::new(
		GlobalState::setup(ctx, config, reporter.clone())
			.await
			.context("failed to setup global state")?,
	);

	let mut signal_handler = SignalHandler::shutdown().context("failed to install signal handlers")?;

	let api_future = tokio::spawn(api::run(global.clone()));

	select! {
		r = api_future => match r {
			Ok(Ok(())) => tracing::warn!("api stopped"),
			Ok(Err(err)) => tracing::error!("api stopped unexpectedly: {:#}", err),
			Err(err) => tracing::error!("api task panicked: {}", err),
		},
		_ = signal_handler.recv() => tracing::info!("shutting down"),
	}

	// Holding a context while cancelling the handler would deadlock.
	drop(global);

	tracing::info!("waiting for tasks to finish");

	select! {
		r = handler.cancel().timeout(Duration::from_secs(60)) => match r {
			Ok(()) => tracing::info!("shutdown complete"),
			Err(_) => tracing::warn!("force shutting down"),
		},
		_ = signal_handler.recv() => tracing::warn!("force shutting down"),
	}

	reporter.flush().await;

	Ok(())
}
