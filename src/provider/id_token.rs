//! Verifier for providers that issue RS256-signed JWT ID tokens.
//!
//! Verification runs offline against the provider's published key set: the header names the
//! key, the key's modulus and exponent rebuild the RSA public key, and the signature, expiry,
//! issuer, and audience are checked before the `sub` claim is trusted. Every failure collapses
//! into [`Error::InvalidSocialToken`]; the precise cause only reaches the logs.

// crates.io
use jsonwebtoken::{Algorithm, Validation};
// self
use crate::{
	_prelude::*,
	auth::{ProviderKind, SubjectId, TokenSecret},
	config::IdTokenConfig,
	http::ProviderHttpClient,
	obs,
	provider::JwksSource,
};

const CLOCK_SKEW_LEEWAY_SECS: u64 = 60;

/// Claims the gateway reads from an ID token.
#[derive(Clone, Debug, Deserialize)]
pub struct IdTokenClaims {
	/// Provider subject.
	pub sub: String,
	/// Issuer.
	pub iss: String,
	/// Audience, either one client id or several.
	pub aud: Audience,
	/// Expiry (unix seconds).
	pub exp: i64,
}

/// `aud` claim, which providers encode as a string or an array of strings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Audience {
	/// Single audience.
	One(String),
	/// Several audiences.
	Many(Vec<String>),
}
impl Audience {
	/// Iterates over every audience value.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		let values: &[String] = match self {
			Self::One(value) => std::slice::from_ref(value),
			Self::Many(values) => values,
		};

		values.iter().map(String::as_str)
	}
}

/// Verifies signed ID tokens for one provider.
pub struct IdTokenVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	provider: ProviderKind,
	issuers: Vec<String>,
	audiences: HashSet<String>,
	keys: JwksSource<C>,
}
impl<C> IdTokenVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Builds a verifier from trust settings and a key source.
	pub fn new(
		provider: ProviderKind,
		config: &IdTokenConfig,
		timeout: Duration,
		http: Arc<C>,
	) -> Self {
		let keys = JwksSource::new(
			provider,
			config.jwks_url.clone(),
			timeout,
			config.jwks_cache_ttl,
			http,
		);
		let audiences =
			config.audiences.iter().filter(|aud| !aud.trim().is_empty()).cloned().collect();

		Self { provider, issuers: config.issuers.clone(), audiences, keys }
	}

	/// Provider this verifier trusts.
	pub fn provider_kind(&self) -> ProviderKind {
		self.provider
	}

	/// Key source backing this verifier.
	pub fn keys(&self) -> &JwksSource<C> {
		&self.keys
	}

	/// Verifies `token` and returns its subject.
	pub async fn verify(&self, token: &TokenSecret) -> Result<SubjectId> {
		let fingerprint = token.fingerprint();
		let reject = |reason: &dyn Display| {
			obs::log_rejection(self.provider.as_str(), &fingerprint, reason);

			Error::InvalidSocialToken
		};
		let header = jsonwebtoken::decode_header(token.expose()).map_err(|e| reject(&e))?;

		if header.alg != Algorithm::RS256 {
			return Err(reject(&format_args!("unsupported algorithm {:?}", header.alg)));
		}

		let kid = header.kid.ok_or_else(|| reject(&"token header has no key id"))?;
		let jwk = self
			.keys
			.find(&kid, &fingerprint)
			.await?
			.ok_or_else(|| reject(&format_args!("unknown key id {kid}")))?;
		let key = jwk.rsa_key().map_err(|e| reject(&e))?;
		let claims =
			jsonwebtoken::decode::<IdTokenClaims>(token.expose(), &key, &self.validation())
				.map_err(|e| reject(&e))?
				.claims;

		if !claims.aud.iter().any(|aud| self.audiences.contains(aud)) {
			return Err(reject(&"audience is not an accepted client id"));
		}

		SubjectId::new(&claims.sub).map_err(|e| reject(&e))
	}

	fn validation(&self) -> Validation {
		let mut validation = Validation::new(Algorithm::RS256);

		validation.leeway = CLOCK_SKEW_LEEWAY_SECS;
		validation.validate_exp = true;
		// Audience is matched against the configured set after decoding.
		validation.validate_aud = false;
		validation.set_issuer(&self.issuers);
		validation.set_required_spec_claims(&["exp", "iss", "sub", "aud"]);

		validation
	}
}
impl<C> Debug for IdTokenVerifier<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdTokenVerifier")
			.field("provider", &self.provider)
			.field("issuers", &self.issuers)
			.field("audiences", &self.audiences)
			.field("keys", &self.keys)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn audience_accepts_string_or_array() {
		let one: Audience =
			serde_json::from_str(r#""web.apps""#).expect("String aud should parse.");
		let many: Audience =
			serde_json::from_str(r#"["web.apps","ios.apps"]"#).expect("Array aud should parse.");

		assert_eq!(one.iter().collect::<Vec<_>>(), ["web.apps"]);
		assert_eq!(many.iter().collect::<Vec<_>>(), ["web.apps", "ios.apps"]);
	}
}
