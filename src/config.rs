//! Immutable gateway configuration plus the builder that validates it.
//!
//! Every value the gateway needs (client identifiers, TTLs, endpoints, timeouts) lives in
//! [`GatewayConfig`]. The struct is `Deserialize` so hosts can load it from any serde format,
//! but it must pass [`GatewayConfig::validate`] before the gateway accepts it.

// self
use crate::{
	_prelude::*,
	auth::{ProviderKind, TokenSecret},
	error::ConfigError,
};

/// Default Kakao "who am I" endpoint.
pub const KAKAO_USER_INFO_URL: &str = "https://kapi.kakao.com/v2/user/me";
/// Default Naver "who am I" endpoint.
pub const NAVER_USER_INFO_URL: &str = "https://openapi.naver.com/v1/nid/me";
/// Default Google signing key set.
pub const GOOGLE_JWKS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
/// Default Apple signing key set.
pub const APPLE_JWKS_URL: &str = "https://appleid.apple.com/auth/keys";
/// Issuers Google stamps on ID tokens.
pub const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];
/// Issuer Apple stamps on ID tokens.
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

const MIN_SECRET_LEN: usize = 32;
const DEFAULT_ACCESS_TTL: Duration = Duration::minutes(30);
const DEFAULT_REFRESH_TTL: Duration = Duration::days(14);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(5);
const DEFAULT_GOOGLE_JWKS_CACHE: Duration = Duration::hours(1);
const DEFAULT_NICKNAME_ATTEMPTS: usize = 32;

/// Session token settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
	/// HS256 signing secret shared by access and refresh tokens.
	pub signing_secret: TokenSecret,
	/// Access token lifetime.
	#[serde(with = "seconds")]
	pub access_ttl: Duration,
	/// Refresh token lifetime; also the session store entry TTL.
	#[serde(with = "seconds")]
	pub refresh_ttl: Duration,
}

/// Trust settings for a provider that issues signed ID tokens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdTokenConfig {
	/// JSON Web Key Set endpoint.
	pub jwks_url: Url,
	/// Accepted `iss` values.
	pub issuers: Vec<String>,
	/// Accepted `aud` values (one per client platform).
	pub audiences: Vec<String>,
	/// How long a fetched key set may be reused; `None` fetches on every verification.
	#[serde(default, with = "seconds::option")]
	pub jwks_cache_ttl: Option<Duration>,
}

/// Endpoints and trust anchors for all four providers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvidersConfig {
	/// Kakao user-info endpoint.
	pub kakao_user_info_url: Url,
	/// Naver user-info endpoint.
	pub naver_user_info_url: Url,
	/// Google ID token settings.
	pub google: IdTokenConfig,
	/// Apple ID token settings.
	pub apple: IdTokenConfig,
}

/// Immutable configuration injected into the gateway at construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
	/// Session token settings.
	pub session: SessionConfig,
	/// Provider endpoints and trust anchors.
	pub providers: ProvidersConfig,
	/// Bound applied to every outbound provider call.
	#[serde(with = "seconds")]
	pub request_timeout: Duration,
	/// Random nickname draws allowed before account creation gives up.
	pub nickname_attempts: usize,
}
impl GatewayConfig {
	/// Starts a builder seeded with production endpoints and defaults.
	pub fn builder(signing_secret: impl Into<String>) -> GatewayConfigBuilder {
		GatewayConfigBuilder::new(signing_secret)
	}

	/// Checks the invariants the gateway relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.session.signing_secret.expose().len() < MIN_SECRET_LEN {
			return Err(ConfigError::WeakSigningSecret { min: MIN_SECRET_LEN });
		}

		ensure_positive("access_ttl", self.session.access_ttl)?;
		ensure_positive("refresh_ttl", self.session.refresh_ttl)?;
		ensure_positive("request_timeout", self.request_timeout)?;

		if self.session.access_ttl >= self.session.refresh_ttl {
			return Err(ConfigError::AccessOutlivesRefresh);
		}
		if self.nickname_attempts == 0 {
			return Err(ConfigError::NoNicknameAttempts);
		}

		validate_endpoint("kakao user-info", &self.providers.kakao_user_info_url)?;
		validate_endpoint("naver user-info", &self.providers.naver_user_info_url)?;
		validate_id_token(ProviderKind::Google, "google jwks", &self.providers.google)?;
		validate_id_token(ProviderKind::Apple, "apple jwks", &self.providers.apple)?;

		Ok(())
	}
}

/// Builder for [`GatewayConfig`] values.
#[derive(Debug)]
pub struct GatewayConfigBuilder {
	config: GatewayConfig,
}
impl GatewayConfigBuilder {
	fn new(signing_secret: impl Into<String>) -> Self {
		let config = GatewayConfig {
			session: SessionConfig {
				signing_secret: TokenSecret::new(signing_secret),
				access_ttl: DEFAULT_ACCESS_TTL,
				refresh_ttl: DEFAULT_REFRESH_TTL,
			},
			providers: ProvidersConfig {
				kakao_user_info_url: default_url(KAKAO_USER_INFO_URL),
				naver_user_info_url: default_url(NAVER_USER_INFO_URL),
				google: IdTokenConfig {
					jwks_url: default_url(GOOGLE_JWKS_URL),
					issuers: GOOGLE_ISSUERS.iter().map(|s| (*s).to_owned()).collect(),
					audiences: Vec::new(),
					jwks_cache_ttl: Some(DEFAULT_GOOGLE_JWKS_CACHE),
				},
				apple: IdTokenConfig {
					jwks_url: default_url(APPLE_JWKS_URL),
					issuers: vec![APPLE_ISSUER.to_owned()],
					audiences: Vec::new(),
					jwks_cache_ttl: None,
				},
			},
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			nickname_attempts: DEFAULT_NICKNAME_ATTEMPTS,
		};

		Self { config }
	}

	/// Overrides the access token lifetime.
	pub fn access_ttl(mut self, ttl: Duration) -> Self {
		self.config.session.access_ttl = ttl;

		self
	}

	/// Overrides the refresh token lifetime.
	pub fn refresh_ttl(mut self, ttl: Duration) -> Self {
		self.config.session.refresh_ttl = ttl;

		self
	}

	/// Overrides the outbound request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.config.request_timeout = timeout;

		self
	}

	/// Overrides how many nickname draws account creation may take.
	pub fn nickname_attempts(mut self, attempts: usize) -> Self {
		self.config.nickname_attempts = attempts;

		self
	}

	/// Accepts Google ID tokens minted for the web, Android, and iOS clients.
	pub fn google_client_ids(
		mut self,
		web: impl Into<String>,
		android: impl Into<String>,
		ios: impl Into<String>,
	) -> Self {
		self.config.providers.google.audiences = vec![web.into(), android.into(), ios.into()];

		self
	}

	/// Accepts Apple ID tokens minted for the given app identifier.
	pub fn apple_client_id(mut self, client_id: impl Into<String>) -> Self {
		self.config.providers.apple.audiences = vec![client_id.into()];

		self
	}

	/// Points the Kakao verifier at a different user-info endpoint.
	pub fn kakao_user_info_url(mut self, url: Url) -> Self {
		self.config.providers.kakao_user_info_url = url;

		self
	}

	/// Points the Naver verifier at a different user-info endpoint.
	pub fn naver_user_info_url(mut self, url: Url) -> Self {
		self.config.providers.naver_user_info_url = url;

		self
	}

	/// Points the Google verifier at a different key set.
	pub fn google_jwks_url(mut self, url: Url) -> Self {
		self.config.providers.google.jwks_url = url;

		self
	}

	/// Points the Apple verifier at a different key set.
	pub fn apple_jwks_url(mut self, url: Url) -> Self {
		self.config.providers.apple.jwks_url = url;

		self
	}

	/// Overrides how long a provider's key set may be cached.
	pub fn jwks_cache_ttl(mut self, provider: ProviderKind, ttl: Option<Duration>) -> Self {
		match provider {
			ProviderKind::Google => self.config.providers.google.jwks_cache_ttl = ttl,
			ProviderKind::Apple => self.config.providers.apple.jwks_cache_ttl = ttl,
			ProviderKind::Kakao | ProviderKind::Naver => {},
		}

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<GatewayConfig, ConfigError> {
		self.config.validate()?;

		Ok(self.config)
	}
}

fn default_url(raw: &'static str) -> Url {
	// Compile-time constants above are known-good.
	Url::parse(raw).unwrap_or_else(|_| unreachable!("built-in endpoint {raw} must parse"))
}

fn ensure_positive(field: &'static str, value: Duration) -> Result<(), ConfigError> {
	if value.is_positive() { Ok(()) } else { Err(ConfigError::NonPositiveDuration { field }) }
}

fn validate_id_token(
	provider: ProviderKind,
	endpoint: &'static str,
	config: &IdTokenConfig,
) -> Result<(), ConfigError> {
	if config.audiences.iter().all(|aud| aud.trim().is_empty()) {
		return Err(ConfigError::MissingAudience { provider });
	}
	if let Some(ttl) = config.jwks_cache_ttl {
		ensure_positive("jwks_cache_ttl", ttl)?;
	}

	validate_endpoint(endpoint, &config.jwks_url)
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	let loopback = matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"));

	if url.scheme() == "https" || loopback {
		Ok(())
	} else {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

mod seconds {
	// crates.io
	use serde::{Deserializer, Serializer};
	// self
	use crate::_prelude::*;

	pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_i64(value.whole_seconds())
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
	where
		D: Deserializer<'de>,
	{
		i64::deserialize(deserializer).map(Duration::seconds)
	}

	pub mod option {
		// crates.io
		use serde::{Deserializer, Serializer};
		// self
		use crate::_prelude::*;

		pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			match value {
				Some(value) => serializer.serialize_some(&value.whole_seconds()),
				None => serializer.serialize_none(),
			}
		}

		pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
		where
			D: Deserializer<'de>,
		{
			Option::<i64>::deserialize(deserializer).map(|value| value.map(Duration::seconds))
		}
	}
}
