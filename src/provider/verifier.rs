//! Closed set of provider verifiers behind one `verify` entry point.

// self
use crate::{
	_prelude::*,
	auth::{ProviderKind, SubjectId, TokenSecret},
	http::ProviderHttpClient,
	obs::{self, VerifyOutcome},
	provider::{BearerVerifier, IdTokenVerifier},
};

/// One verifier per supported provider.
#[derive(Debug)]
pub enum ProviderVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Kakao bearer lookup.
	Kakao(BearerVerifier<C>),
	/// Naver bearer lookup.
	Naver(BearerVerifier<C>),
	/// Google ID token.
	Google(IdTokenVerifier<C>),
	/// Apple ID token.
	Apple(IdTokenVerifier<C>),
}
impl<C> ProviderVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Provider this verifier answers for.
	pub fn provider_kind(&self) -> ProviderKind {
		match self {
			Self::Kakao(_) => ProviderKind::Kakao,
			Self::Naver(_) => ProviderKind::Naver,
			Self::Google(_) => ProviderKind::Google,
			Self::Apple(_) => ProviderKind::Apple,
		}
	}

	/// Proves `token` belongs to a provider subject and returns that subject.
	pub async fn verify(&self, token: &TokenSecret) -> Result<SubjectId> {
		let result = match self {
			Self::Kakao(inner) | Self::Naver(inner) => inner.verify(token).await,
			Self::Google(inner) | Self::Apple(inner) => inner.verify(token).await,
		};

		obs::record_provider_verification(self.provider_kind(), VerifyOutcome::of(&result));

		result
	}
}
