// self
use crate::{
	auth::ProviderKind,
	obs::{FlowKind, FlowOutcome, VerifyOutcome},
};

/// Records a flow outcome via the global metrics recorder (when enabled).
pub fn record_flow_outcome(kind: FlowKind, outcome: FlowOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"social_auth_gateway_flow_total",
			"flow" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a provider verification result via the global metrics recorder (when enabled).
pub fn record_provider_verification(provider: ProviderKind, outcome: VerifyOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"social_auth_gateway_provider_verify_total",
			"provider" => provider.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::{Error, Result, UnavailableError};

	#[test]
	fn recorders_noop_without_metrics() {
		record_flow_outcome(FlowKind::Login, FlowOutcome::Failure);
		record_provider_verification(ProviderKind::Apple, VerifyOutcome::Rejected);
	}

	#[test]
	fn verify_outcome_classifies_errors() {
		let unavailable: Result<()> = Err(UnavailableError::Status {
			provider: ProviderKind::Naver,
			status: 502,
			retry_after: None,
		}
		.into());

		assert_eq!(VerifyOutcome::of(&Ok::<_, Error>(())), VerifyOutcome::Verified);
		assert_eq!(VerifyOutcome::of(&unavailable), VerifyOutcome::Unavailable);
		assert_eq!(
			VerifyOutcome::of::<()>(&Err(Error::InvalidSocialToken)),
			VerifyOutcome::Rejected
		);
	}
}
