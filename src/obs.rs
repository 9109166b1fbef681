//! Optional observability helpers for gateway flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `social_auth_gateway.flow` with the `flow`
//!   (use case), `stage` (call site), and `account` fields, plus `warn` events describing why a
//!   credential was rejected or a provider failed.
//! - Enable `metrics` to increment the `social_auth_gateway_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `social_auth_gateway_provider_verify_total` counter labeled by `provider` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gateway use cases observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Social login.
	Login,
	/// Session pair rotation.
	Reissue,
	/// Session revocation.
	Logout,
	/// Access token check for protected requests.
	Authenticate,
	/// Profile read or edit.
	Profile,
	/// Account withdrawal.
	Withdraw,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Login => "login",
			FlowKind::Reissue => "reissue",
			FlowKind::Logout => "logout",
			FlowKind::Authenticate => "authenticate",
			FlowKind::Profile => "profile",
			FlowKind::Withdraw => "withdraw",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a gateway operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Result of a single provider verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerifyOutcome {
	/// Credential proved a subject.
	Verified,
	/// Credential was rejected.
	Rejected,
	/// Provider or its key endpoint could not be used.
	Unavailable,
}
impl VerifyOutcome {
	/// Classifies a verification result.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Verified,
			Err(Error::ProviderUnavailable(_)) => Self::Unavailable,
			Err(_) => Self::Rejected,
		}
	}

	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			VerifyOutcome::Verified => "verified",
			VerifyOutcome::Rejected => "rejected",
			VerifyOutcome::Unavailable => "unavailable",
		}
	}
}
impl Display for VerifyOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
