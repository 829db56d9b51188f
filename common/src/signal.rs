use tokio::signal::unix::{Signal, SignalKind};

/// Fans several unix signals into a single `recv` call.
pub struct SignalHandler {
	signals: Vec<(SignalKind, Signal)>,
}

impl Default for SignalHandler {
	fn default() -> Self {
		Self::new()
	}
}

impl SignalHandler {
	pub fn new() -> Self {
		Self { signals: Vec::new() }
	}

	/// SIGINT and SIGTERM, the pair every service binary listens on.
	pub fn shutdown() -> std::io::Result<Self> {
		Self::new()
			.with_signal(SignalKind::interrupt())?
			.with_signal(SignalKind::terminate())
	}

	pub fn with_signal(mut self, kind: SignalKind) -> std::io::Result<Self> {
		let signal = tokio::signal::unix::signal(kind)?;
		self.signals.push((kind, signal));
		Ok(self)
	}

	/// Resolves with the kind of the next signal received. Pends forever when
	/// no signals are registered.
	pub async fn recv(&mut self) -> SignalKind {
		if self.signals.is_empty() {
			return std::future::pending().await;
		}

		let futures = self
			.signals
			.iter_mut()
			.map(|(kind, signal)| {
				let kind = *kind;
				Box::pin(async move {
					signal.recv().await;
					kind
				})
			})
			.collect::<Vec<_>>();

		let (kind, _, _) = futures_util::future::select_all(futures).await;
		kind
	}
}
