use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::EnvFilter;

static RELOAD_HANDLE: OnceCell<Handle<EnvFilter, tracing_subscriber::Registry>> = OnceCell::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	#[default]
	Default,
	Json,
	Pretty,
	Compact,
}

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
	#[error("invalid log level")]
	InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
	#[error("failed to install subscriber")]
	Install(#[from] tracing_subscriber::util::TryInitError),
	#[error("failed to reload filter")]
	Reload(#[from] tracing_subscriber::reload::Error),
}

/// Installs the process wide subscriber. Calling this again only swaps the
/// level filter, the output mode of the first call sticks.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
	let filter = EnvFilter::from_str(level)?;

	if let Some(handle) = RELOAD_HANDLE.get() {
		handle.reload(filter)?;
		return Ok(());
	}

	RELOAD_HANDLE.get_or_try_init(|| {
		let (filter, handle) = tracing_subscriber::reload::Layer::new(filter);

		let fmt = tracing_subscriber::fmt::layer().with_line_number(true).with_file(true);

		let registry = tracing_subscriber::registry().with(filter);

		match mode {
			Mode::Default => registry.with(fmt).try_init(),
			Mode::Json => registry.with(fmt.json()).try_init(),
			Mode::Pretty => registry.with(fmt.pretty()).try_init(),
			Mode::Compact => registry.with(fmt.compact()).try_init(),
		}
		.map(|_| handle)
	})?;

	tracing::trace!(level, "logging initialized");

	Ok(())
}
