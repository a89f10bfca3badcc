// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// Span wrapping one identity fetch.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the provider id + stage.
	pub fn new(provider: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_identity.fetch", provider, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
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

/// Notes a provider response; bodies are summarized by length, never logged.
pub fn response_received(stage: &'static str, status: u16, body_len: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(target: "oauth2_identity", stage, status, body_len, "Provider responded.");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, status, body_len);
	}
}

/// Notes a sub-call that fell back to a default value instead of failing the fetch.
pub fn degraded(stage: &'static str, reason: impl Display) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			target: "oauth2_identity",
			stage,
			%reason,
			"Provider data unavailable; using the fallback value."
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, reason);
	}
}
