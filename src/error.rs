//! Gateway-level error types shared across providers, stores, and session flows.

// self
use crate::{_prelude::*, auth::ProviderKind};

/// Gateway-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical gateway error exposed by public APIs.
///
/// Token-validation failures deliberately carry no cause; the cause is logged where it is
/// detected so callers cannot use error messages to probe forged tokens.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Session token could not be minted.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Provider or its key endpoint could not be reached; retry later.
	#[error(transparent)]
	ProviderUnavailable(#[from] UnavailableError),

	/// Claimed provider is unknown or not registered.
	#[error("Social login provider is not supported.")]
	InvalidProvider,
	/// Provider credential failed verification.
	#[error("Social token is invalid.")]
	InvalidSocialToken,
	/// Verified subject differs from the subject claimed by the caller.
	#[error("Social token does not belong to the claimed provider account.")]
	ProviderSubjectMismatch,
	/// Access token is malformed or carries a bad signature.
	#[error("Access token is invalid.")]
	InvalidAccessToken,
	/// Access token is well-formed but past its expiry.
	#[error("Access token has expired.")]
	AccessTokenExpired,
	/// Refresh token is missing from the session store or does not match it.
	#[error("Refresh token is invalid.")]
	InvalidRefreshToken,
	/// Display name is held by another active account.
	#[error("Nickname is already in use.")]
	NicknameConflict,
	/// The random-name source could not produce a free display name.
	#[error("Could not allocate a free nickname after {attempts} attempts.")]
	NicknameExhausted {
		/// Attempts made before giving up.
		attempts: usize,
	},
	/// Account does not exist or has been withdrawn.
	#[error("Account does not exist.")]
	AccountNotFound,
}
impl Error {
	/// Returns `true` when the caller may retry the same request later.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::ProviderUnavailable(_))
	}

	/// Provider-supplied backoff hint for retryable errors.
	pub fn retry_after(&self) -> Option<Duration> {
		match self {
			Self::ProviderUnavailable(UnavailableError::Status { retry_after, .. }) => *retry_after,
			_ => None,
		}
	}

	/// Suggested HTTP status for transports that surface this error.
	pub fn status_code(&self) -> u16 {
		match self {
			Self::InvalidProvider
			| Self::InvalidSocialToken
			| Self::ProviderSubjectMismatch
			| Self::InvalidRefreshToken
			| Self::AccountNotFound => 404,
			Self::InvalidAccessToken | Self::AccessTokenExpired => 401,
			Self::NicknameConflict => 409,
			Self::ProviderUnavailable(_) => 503,
			Self::Storage(_)
			| Self::Config(_)
			| Self::Signing(_)
			| Self::NicknameExhausted { .. } => 500,
		}
	}

	/// Stable numeric code (`<status><domain><sequence>`) for client-side handling.
	pub fn code(&self) -> u32 {
		match self {
			Self::InvalidSocialToken => 4040101,
			Self::InvalidAccessToken => 4010102,
			Self::InvalidRefreshToken => 4040103,
			Self::InvalidProvider => 4040104,
			Self::ProviderSubjectMismatch => 4040105,
			Self::AccessTokenExpired => 4010108,
			Self::AccountNotFound => 4040201,
			Self::NicknameConflict => 4090201,
			Self::ProviderUnavailable(err) => match err.provider() {
				ProviderKind::Kakao => 5030102,
				ProviderKind::Google => 5030103,
				ProviderKind::Naver => 5030104,
				ProviderKind::Apple => 5030105,
			},
			Self::Signing(_) => 5000101,
			Self::Storage(_) => 5000002,
			Self::Config(_) | Self::NicknameExhausted { .. } => 5000001,
		}
	}
}

/// Configuration and validation failures raised while assembling the gateway.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Session signing secret is too short for HS256.
	#[error("Session signing secret must be at least {min} bytes.")]
	WeakSigningSecret {
		/// Minimum accepted length.
		min: usize,
	},
	/// A TTL or timeout is zero or negative.
	#[error("The {field} duration must be positive.")]
	NonPositiveDuration {
		/// Offending configuration field.
		field: &'static str,
	},
	/// Access tokens must expire before the refresh tokens that renew them.
	#[error("Access token TTL must be shorter than the refresh token TTL.")]
	AccessOutlivesRefresh,
	/// A provider has no accepted audience configured.
	#[error("No accepted client identifiers configured for {provider}.")]
	MissingAudience {
		/// Provider missing its audience set.
		provider: ProviderKind,
	},
	/// Endpoint must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Nickname generation must be allowed at least one attempt.
	#[error("Nickname attempts must be at least one.")]
	NoNicknameAttempts,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failure minting a session token.
#[derive(Debug, ThisError)]
#[error("Failed to sign the {kind} token.")]
pub struct SigningError {
	/// Token kind label (`access` or `refresh`).
	pub kind: &'static str,
	/// Underlying JWT encoder failure.
	#[source]
	pub source: jsonwebtoken::errors::Error,
}

/// Provider outage variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum UnavailableError {
	/// Provider answered with a server-side error status.
	#[error("{provider} returned HTTP {status}.")]
	Status {
		/// Provider that failed.
		provider: ProviderKind,
		/// HTTP status code returned upstream.
		status: u16,
		/// Retry-After hint from the provider, if any.
		retry_after: Option<Duration>,
	},
	/// Provider answered 2xx with a body the gateway could not interpret.
	#[error("{provider} returned an unexpected response body.")]
	UnexpectedBody {
		/// Provider that failed.
		provider: ProviderKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Transport failed before a response arrived.
	#[error("{provider} could not be reached.")]
	Transport {
		/// Provider that failed.
		provider: ProviderKind,
		/// Transport failure.
		#[source]
		source: TransportError,
	},
}
impl UnavailableError {
	/// Provider the outage is attributed to.
	pub fn provider(&self) -> ProviderKind {
		match self {
			Self::Status { provider, .. }
			| Self::UnexpectedBody { provider, .. }
			| Self::Transport { provider, .. } => *provider,
		}
	}
}

/// Transport-level failures (network, timeout, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Request exceeded the configured timeout.
	#[error("Request timed out.")]
	Timeout,
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_outages_are_retryable() {
		let outage = Error::from(UnavailableError::Status {
			provider: ProviderKind::Kakao,
			status: 502,
			retry_after: Some(Duration::seconds(30)),
		});

		assert!(outage.is_retryable());
		assert_eq!(outage.status_code(), 503);
		assert_eq!(outage.code(), 5030102);
		assert_eq!(outage.retry_after(), Some(Duration::seconds(30)));
		assert!(!Error::InvalidSocialToken.is_retryable());
		assert!(!Error::InvalidRefreshToken.is_retryable());
	}

	#[test]
	fn token_failures_hide_their_cause() {
		let err = Error::InvalidSocialToken;

		assert_eq!(err.to_string(), "Social token is invalid.");
		assert!(StdError::source(&err).is_none());
	}

	#[test]
	fn codes_follow_status_families() {
		assert_eq!(Error::ProviderSubjectMismatch.code(), 4040105);
		assert_eq!(Error::AccessTokenExpired.status_code(), 401);
		assert_eq!(Error::NicknameConflict.status_code(), 409);
		assert_eq!(Error::NicknameConflict.code(), 4090201);
	}
}
