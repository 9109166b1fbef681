//! Span and log helpers; every item compiles to a no-op without the `tracing` feature.

// self
use crate::{_prelude::*, auth::AccountId, obs::FlowKind};

/// Future returned by [`FlowSpan::instrument`].
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Future returned by [`FlowSpan::instrument`].
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// Span wrapping one gateway operation.
///
/// Carries `flow` and `stage` from the start and an `account` field filled in once the
/// operation knows which account it acted on.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Opens a span for `kind` at `stage`.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"social_auth_gateway.flow",
				flow = kind.as_str(),
				stage,
				account = tracing::field::Empty,
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Tags the span with the account the operation resolved to.
	pub fn record_account(&self, account: AccountId) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("account", tracing::field::display(account));
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = account;
		}
	}

	/// Runs `fut` inside the span.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs why a credential was rejected. Only the fingerprint of the credential is recorded.
pub fn log_rejection(source: &'static str, fingerprint: &str, reason: &dyn Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(source, fingerprint, %reason, "credential rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (source, fingerprint, reason);
	}
}

/// Logs a provider or storage failure that the caller sees only as a coarse error kind.
pub fn log_failure(source: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(source, error = %error, "upstream failure");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (source, error);
	}
}
