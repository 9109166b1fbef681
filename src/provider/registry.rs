//! Explicit lookup table from provider kind to its configured verifier.

// self
use crate::{
	_prelude::*,
	auth::ProviderKind,
	config::GatewayConfig,
	http::ProviderHttpClient,
	provider::{BearerVerifier, IdTokenVerifier, ProviderVerifier},
};

/// Registered verifiers keyed by [`ProviderKind`].
#[derive(Debug)]
pub struct ProviderRegistry<C>
where
	C: ?Sized + ProviderHttpClient,
{
	verifiers: HashMap<ProviderKind, ProviderVerifier<C>>,
}
impl<C> ProviderRegistry<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Registry with no providers; every lookup fails until verifiers are registered.
	pub fn empty() -> Self {
		Self { verifiers: HashMap::new() }
	}

	/// Registers all four providers from `config`, sharing one HTTP transport.
	pub fn from_config(config: &GatewayConfig, http: Arc<C>) -> Self {
		let timeout = config.request_timeout;
		let providers = &config.providers;

		Self::empty()
			.with(ProviderVerifier::Kakao(BearerVerifier::kakao(
				providers.kakao_user_info_url.clone(),
				timeout,
				http.clone(),
			)))
			.with(ProviderVerifier::Naver(BearerVerifier::naver(
				providers.naver_user_info_url.clone(),
				timeout,
				http.clone(),
			)))
			.with(ProviderVerifier::Google(IdTokenVerifier::new(
				ProviderKind::Google,
				&providers.google,
				timeout,
				http.clone(),
			)))
			.with(ProviderVerifier::Apple(IdTokenVerifier::new(
				ProviderKind::Apple,
				&providers.apple,
				timeout,
				http,
			)))
	}

	/// Adds or replaces the verifier for its provider.
	pub fn with(mut self, verifier: ProviderVerifier<C>) -> Self {
		self.register(verifier);

		self
	}

	/// Adds or replaces the verifier for its provider, returning the previous one.
	pub fn register(&mut self, verifier: ProviderVerifier<C>) -> Option<ProviderVerifier<C>> {
		self.verifiers.insert(verifier.provider_kind(), verifier)
	}

	/// Verifier registered for `kind`.
	pub fn get(&self, kind: ProviderKind) -> Option<&ProviderVerifier<C>> {
		self.verifiers.get(&kind)
	}

	/// Providers that currently have a verifier.
	pub fn kinds(&self) -> impl Iterator<Item = ProviderKind> + '_ {
		ProviderKind::ALL.into_iter().filter(|kind| self.verifiers.contains_key(kind))
	}
}
