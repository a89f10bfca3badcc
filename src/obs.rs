//! Optional observability helpers for identity fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oauth2_identity.fetch` with the `provider` and
//!   `stage` fields, plus `debug!` events whenever a sub-call degrades to a default value.
//! - Enable `metrics` to increment the `oauth2_identity_fetch_total` counter for every
//!   attempt/success/failure, labeled by `provider` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each identity fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Entry to the façade.
	Attempt,
	/// Canonical identity produced.
	Success,
	/// Fatal error propagated back to the caller.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
