//! Transport primitives for provider "who am I" and key-set calls.
//!
//! The gateway only ever issues bounded `GET` requests, so [`ProviderHttpClient`] is a single
//! method returning the status, an optional `Retry-After` hint, and the raw body. Downstream
//! crates can plug in their own HTTP stack by implementing the trait; the default
//! [`ReqwestHttpClient`] ships behind the `reqwest` feature.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::{
	header::{ACCEPT, HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{_prelude::*, auth::TokenSecret, error::TransportError};

/// Boxed future returned by [`ProviderHttpClient::get`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ProviderResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports used to reach identity providers.
///
/// Implementations must enforce [`ProviderRequest::timeout`] and report an elapsed timeout as
/// [`TransportError::Timeout`]. Redirects must not be followed; a provider endpoint answers
/// directly or not at all.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Performs a `GET` and returns the response regardless of its status.
	fn get(&self, request: ProviderRequest) -> HttpFuture<'_>;
}

/// Outbound provider request.
#[derive(Clone, Debug)]
pub struct ProviderRequest {
	/// Target endpoint.
	pub url: Url,
	/// Bearer credential, when the endpoint identifies the caller by token.
	pub bearer: Option<TokenSecret>,
	/// Upper bound on the whole exchange.
	pub timeout: Duration,
}
impl ProviderRequest {
	/// Unauthenticated `GET` (key-set downloads).
	pub fn anonymous(url: Url, timeout: Duration) -> Self {
		Self { url, bearer: None, timeout }
	}

	/// `GET` carrying `token` as a bearer credential.
	pub fn bearer(url: Url, token: TokenSecret, timeout: Duration) -> Self {
		Self { url, bearer: Some(token), timeout }
	}
}

/// Provider response captured by the transport.
#[derive(Clone, Debug, Default)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns `true` for 4xx statuses.
	pub fn is_client_error(&self) -> bool {
		(400..500).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client that never follows redirects.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`]; configure it to disable redirects.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	fn get(&self, request: ProviderRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let mut builder = self
				.0
				.get(request.url)
				.header(ACCEPT, "application/json")
				.timeout(request.timeout.unsigned_abs());

			if let Some(token) = &request.bearer {
				builder = builder.bearer_auth(token.expose());
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await?.to_vec();

			Ok(ProviderResponse { status, retry_after, body })
		})
	}
}
impl<C> ProviderHttpClient for Arc<C>
where
	C: ProviderHttpClient,
{
	fn get(&self, request: ProviderRequest) -> HttpFuture<'_> {
		(**self).get(request)
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
