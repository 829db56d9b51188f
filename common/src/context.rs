use std::fmt::{Display, Formatter};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CancelReason {
	Deadline,
	Cancel,
}

impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Deadline => write!(f, "Deadline"),
			Self::Cancel => write!(f, "Cancel"),
		}
	}
}

/// A cloneable shutdown signal. Every clone counts as an in-flight holder:
/// [`Handler::cancel`] only resolves after all of them have been dropped.
#[derive(Clone, Debug)]
pub struct Context {
	token: CancellationToken,
	deadline: Option<Instant>,
	_alive: mpsc::Sender<()>,
}

impl Context {
	#[must_use]
	pub fn new() -> (Self, Handler) {
		let token = CancellationToken::new();
		let (alive, alive_recv) = mpsc::channel(1);

		(
			Self {
				token: token.clone(),
				deadline: None,
				_alive: alive,
			},
			Handler { token, alive_recv },
		)
	}

	#[must_use]
	pub fn with_deadline(deadline: Instant) -> (Self, Handler) {
		let (mut ctx, handler) = Self::new();
		ctx.deadline = Some(deadline);
		(ctx, handler)
	}

	#[must_use]
	pub fn with_timeout(timeout: Duration) -> (Self, Handler) {
		Self::with_deadline(Instant::now() + timeout)
	}

	pub fn is_done(&self) -> bool {
		self.token.is_cancelled() || self.deadline.is_some_and(|d| d <= Instant::now())
	}

	pub async fn done(&self) -> CancelReason {
		match self.deadline {
			Some(deadline) => {
				tokio::select! {
					_ = self.token.cancelled() => CancelReason::Cancel,
					_ = tokio::time::sleep_until(deadline) => CancelReason::Deadline,
				}
			}
			None => {
				self.token.cancelled().await;
				CancelReason::Cancel
			}
		}
	}
}

#[derive(Debug)]
pub struct Handler {
	token: CancellationToken,
	alive_recv: mpsc::Receiver<()>,
}

impl Handler {
	/// Waits until every context clone has been dropped, without cancelling.
	pub async fn done(&mut self) {
		while self.alive_recv.recv().await.is_some() {}
	}

	/// Cancels all contexts and waits for them to be released.
	pub async fn cancel(mut self) {
		self.token.cancel();
		self.done().await;
	}
}
