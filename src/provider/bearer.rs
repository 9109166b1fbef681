//! Verifier for providers whose access tokens are opaque bearer credentials.

// crates.io
use serde::{Deserializer, de::Error as _};
// self
use crate::{
	_prelude::*,
	auth::{ProviderKind, SubjectId, TokenSecret},
	http::{ProviderHttpClient, ProviderRequest},
	obs, provider,
};

type SubjectParser = fn(&[u8]) -> Result<SubjectId>;

/// Resolves a bearer token to a subject by calling the provider's "who am I" endpoint.
pub struct BearerVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	provider: ProviderKind,
	endpoint: Url,
	timeout: Duration,
	http: Arc<C>,
	parse: SubjectParser,
}
impl<C> BearerVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Kakao user-info endpoint, answering `{"id": <number|string>}`.
	pub fn kakao(endpoint: Url, timeout: Duration, http: Arc<C>) -> Self {
		Self { provider: ProviderKind::Kakao, endpoint, timeout, http, parse: kakao_subject }
	}

	/// Naver user-info endpoint, answering `{"response": {"id": "<string>"}}`.
	pub fn naver(endpoint: Url, timeout: Duration, http: Arc<C>) -> Self {
		Self { provider: ProviderKind::Naver, endpoint, timeout, http, parse: naver_subject }
	}

	/// Provider this verifier speaks to.
	pub fn provider_kind(&self) -> ProviderKind {
		self.provider
	}

	/// Exchanges `token` for the subject it was issued to.
	pub async fn verify(&self, token: &TokenSecret) -> Result<SubjectId> {
		let fingerprint = token.fingerprint();

		if token.expose().trim().is_empty() {
			obs::log_rejection(self.provider.as_str(), &fingerprint, &"empty bearer token");

			return Err(Error::InvalidSocialToken);
		}

		let request = ProviderRequest::bearer(self.endpoint.clone(), token.clone(), self.timeout);
		let response =
			provider::send(self.http.as_ref(), self.provider, request, &fingerprint).await?;

		(self.parse)(&response.body)
	}
}
impl<C> Debug for BearerVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerVerifier")
			.field("provider", &self.provider)
			.field("endpoint", &self.endpoint.as_str())
			.field("timeout", &self.timeout)
			.finish_non_exhaustive()
	}
}

#[derive(Deserialize)]
struct KakaoUser {
	#[serde(deserialize_with = "kakao_id")]
	id: SubjectId,
}

#[derive(Deserialize)]
struct NaverEnvelope {
	response: NaverUser,
}

#[derive(Deserialize)]
struct NaverUser {
	id: SubjectId,
}

fn kakao_subject(body: &[u8]) -> Result<SubjectId> {
	provider::parse_body::<KakaoUser>(ProviderKind::Kakao, body).map(|user| user.id)
}

fn naver_subject(body: &[u8]) -> Result<SubjectId> {
	provider::parse_body::<NaverEnvelope>(ProviderKind::Naver, body).map(|env| env.response.id)
}

// Kakao serializes the member id as a JSON number; some proxies stringify it.
fn kakao_id<'de, D>(deserializer: D) -> Result<SubjectId, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum RawId {
		Number(u64),
		Text(String),
	}

	let raw = match RawId::deserialize(deserializer)? {
		RawId::Number(n) => n.to_string(),
		RawId::Text(s) => s,
	};

	SubjectId::new(raw).map_err(D::Error::custom)
}
