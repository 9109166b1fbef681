//! JSON Web Key Set download and caching for ID-token providers.

// crates.io
use jsonwebtoken::DecodingKey;
// self
use crate::{
	_prelude::*,
	auth::ProviderKind,
	http::{ProviderHttpClient, ProviderRequest},
	provider,
};

/// One published signing key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
	/// Key type; only `RSA` keys are usable.
	pub kty: String,
	/// Key id matched against the token header.
	#[serde(default)]
	pub kid: Option<String>,
	/// Declared algorithm, if the provider publishes one.
	#[serde(default)]
	pub alg: Option<String>,
	/// Declared use (`sig`).
	#[serde(default, rename = "use")]
	pub key_use: Option<String>,
	/// RSA modulus, base64url.
	#[serde(default)]
	pub n: Option<String>,
	/// RSA public exponent, base64url.
	#[serde(default)]
	pub e: Option<String>,
}
impl Jwk {
	/// Rebuilds the RSA public key from its modulus and exponent.
	pub fn rsa_key(&self) -> Result<DecodingKey, KeyError> {
		if self.kty != "RSA" {
			return Err(KeyError::UnsupportedKeyType { kty: self.kty.clone() });
		}
		if let Some(alg) = self.alg.as_deref()
			&& alg != "RS256"
		{
			return Err(KeyError::UnsupportedAlgorithm { alg: alg.to_owned() });
		}

		let (Some(n), Some(e)) = (self.n.as_deref(), self.e.as_deref()) else {
			return Err(KeyError::MissingComponents);
		};

		DecodingKey::from_rsa_components(n, e).map_err(|source| KeyError::Malformed { source })
	}
}

/// Key set document served at a provider's JWKS endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
	/// Published keys.
	pub keys: Vec<Jwk>,
}
impl JwkSet {
	/// Finds the key advertised under `kid`.
	pub fn find(&self, kid: &str) -> Option<&Jwk> {
		self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
	}
}

/// Reasons a published key cannot be used for verification.
#[derive(Debug, ThisError)]
pub enum KeyError {
	/// Key is not an RSA key.
	#[error("Key type {kty} is not supported.")]
	UnsupportedKeyType {
		/// Published key type.
		kty: String,
	},
	/// Key is pinned to an algorithm other than RS256.
	#[error("Key algorithm {alg} is not supported.")]
	UnsupportedAlgorithm {
		/// Published algorithm.
		alg: String,
	},
	/// Modulus or exponent is absent.
	#[error("RSA key is missing its modulus or exponent.")]
	MissingComponents,
	/// Components could not be decoded.
	#[error("RSA key components are malformed.")]
	Malformed {
		/// Decoder failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
}

/// Shortest gap between two downloads of a cached set triggered by unknown key ids.
pub const DEFAULT_MIN_REFETCH_INTERVAL: Duration = Duration::seconds(30);

#[derive(Clone, Debug)]
struct CachedSet {
	keys: Arc<JwkSet>,
	fetched_at: OffsetDateTime,
}

/// Fetches a provider key set, optionally reusing it for a bounded time.
///
/// Without a cache TTL every lookup downloads the set. With one, a lookup for a `kid` the
/// cached set lacks triggers one refetch before the key is reported missing, which covers
/// provider key rotation. Such refetches happen at most once per minimum refetch interval,
/// so tokens with made-up key ids cannot drive traffic to the provider.
pub struct JwksSource<C>
where
	C: ?Sized + ProviderHttpClient,
{
	provider: ProviderKind,
	url: Url,
	timeout: Duration,
	cache_ttl: Option<Duration>,
	min_refetch_interval: Duration,
	http: Arc<C>,
	cache: RwLock<Option<CachedSet>>,
}
impl<C> JwksSource<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a source for `url`.
	pub fn new(
		provider: ProviderKind,
		url: Url,
		timeout: Duration,
		cache_ttl: Option<Duration>,
		http: Arc<C>,
	) -> Self {
		Self {
			provider,
			url,
			timeout,
			cache_ttl,
			min_refetch_interval: DEFAULT_MIN_REFETCH_INTERVAL,
			http,
			cache: RwLock::new(None),
		}
	}

	/// Overrides the shortest gap between refetches caused by unknown key ids.
	pub fn with_min_refetch_interval(mut self, interval: Duration) -> Self {
		self.min_refetch_interval = interval;

		self
	}

	/// Returns the key published under `kid`, downloading the set as needed.
	///
	/// `fingerprint` identifies the token being verified in rejection logs.
	pub async fn find(&self, kid: &str, fingerprint: &str) -> Result<Option<Jwk>> {
		let now = OffsetDateTime::now_utc();

		if let Some(cached) = self.cached(now) {
			if let Some(key) = cached.keys.find(kid) {
				return Ok(Some(key.clone()));
			}
			if now - cached.fetched_at < self.min_refetch_interval {
				return Ok(None);
			}
		}

		let fresh = self.fetch(fingerprint).await?;

		Ok(fresh.find(kid).cloned())
	}

	/// Drops any cached key set.
	pub fn invalidate(&self) {
		*self.cache.write() = None;
	}

	fn cached(&self, now: OffsetDateTime) -> Option<CachedSet> {
		let ttl = self.cache_ttl?;
		let guard = self.cache.read();
		let entry = guard.as_ref()?;

		(now - entry.fetched_at < ttl).then(|| entry.clone())
	}

	async fn fetch(&self, fingerprint: &str) -> Result<Arc<JwkSet>> {
		let request = ProviderRequest::anonymous(self.url.clone(), self.timeout);
		let response =
			provider::send(self.http.as_ref(), self.provider, request, fingerprint).await?;
		let keys = Arc::new(provider::parse_body::<JwkSet>(self.provider, &response.body)?);

		if self.cache_ttl.is_some() {
			*self.cache.write() =
				Some(CachedSet { keys: keys.clone(), fetched_at: OffsetDateTime::now_utc() });
		}

		Ok(keys)
	}
}
impl<C> Debug for JwksSource<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwksSource")
			.field("provider", &self.provider)
			.field("url", &self.url.as_str())
			.field("cache_ttl", &self.cache_ttl)
			.field("min_refetch_interval", &self.min_refetch_interval)
			.finish_non_exhaustive()
	}
}
