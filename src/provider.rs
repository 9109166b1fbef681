//! Provider verifiers that prove a presented social credential belongs to a provider subject.
//!
//! `bearer` covers providers whose access tokens are opaque and must be exchanged at a
//! "who am I" endpoint (Kakao, Naver). `id_token` covers providers that issue signed JWT ID
//! tokens checked offline against a key set published by `jwks` (Google, Apple). `verifier`
//! closes the set in [`ProviderVerifier`] and `registry` maps each [`ProviderKind`] to its
//! configured verifier.

pub mod bearer;
pub mod id_token;
pub mod jwks;
pub mod registry;
pub mod verifier;

pub use bearer::*;
pub use id_token::*;
pub use jwks::*;
pub use registry::*;
pub use verifier::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::ProviderKind,
	error::UnavailableError,
	http::{ProviderHttpClient, ProviderRequest, ProviderResponse},
	obs,
};

/// How a provider's HTTP status is treated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StatusClass {
	/// 2xx.
	Success,
	/// The provider refused the credential.
	Rejected,
	/// The provider is failing or throttling; retry later.
	Unavailable,
}

pub(crate) fn classify_status(status: u16) -> StatusClass {
	match status {
		200..=299 => StatusClass::Success,
		400..=499 => StatusClass::Rejected,
		_ => StatusClass::Unavailable,
	}
}

/// Sends `request` and maps anything but a 2xx into the gateway taxonomy.
pub(crate) async fn send<C>(
	http: &C,
	provider: ProviderKind,
	request: ProviderRequest,
	fingerprint: &str,
) -> Result<ProviderResponse>
where
	C: ?Sized + ProviderHttpClient,
{
	let response = http.get(request).await.map_err(|source| {
		let err = UnavailableError::Transport { provider, source };

		obs::log_failure(provider.as_str(), &err);

		err
	})?;

	match classify_status(response.status) {
		StatusClass::Success => Ok(response),
		StatusClass::Rejected => {
			obs::log_rejection(
				provider.as_str(),
				fingerprint,
				&format_args!("provider answered HTTP {}", response.status),
			);

			Err(Error::InvalidSocialToken)
		},
		StatusClass::Unavailable => {
			let err = UnavailableError::Status {
				provider,
				status: response.status,
				retry_after: response.retry_after,
			};

			obs::log_failure(provider.as_str(), &err);

			Err(err.into())
		},
	}
}

/// Parses a 2xx provider body; a body the gateway cannot read is an upstream fault.
pub(crate) fn parse_body<T>(provider: ProviderKind, body: &[u8]) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
		let err = UnavailableError::UnexpectedBody { provider, source };

		obs::log_failure(provider.as_str(), &err);

		err.into()
	})
}
