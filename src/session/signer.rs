//! HS256 signing and verification of session tokens.

// crates.io
use jsonwebtoken::{
	Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind as JwtErrorKind,
};
// self
use crate::{
	_prelude::*,
	auth::{AccountId, SessionClaims, TokenPair, TokenSecret, TokenUse},
	error::SigningError,
};

/// Why a session token failed verification.
#[derive(Debug, ThisError)]
pub enum TokenRejection {
	/// Signature and structure are fine but the token is past its expiry.
	#[error("Token has expired.")]
	Expired,
	/// Token is of the other half of the pair.
	#[error("Expected a {expected} token but received a {actual} token.")]
	WrongUse {
		/// Half the caller asked for.
		expected: TokenUse,
		/// Half the token declares.
		actual: TokenUse,
	},
	/// Signature, encoding, or claims are invalid.
	#[error("Token is malformed or its signature does not verify.")]
	Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Mints and checks access/refresh tokens with one shared secret.
pub struct TokenSigner {
	encoding: EncodingKey,
	decoding: DecodingKey,
	access_ttl: Duration,
	refresh_ttl: Duration,
}
impl TokenSigner {
	/// Creates a signer for the given secret and lifetimes.
	pub fn new(secret: &TokenSecret, access_ttl: Duration, refresh_ttl: Duration) -> Self {
		let raw = secret.expose().as_bytes();

		Self {
			encoding: EncodingKey::from_secret(raw),
			decoding: DecodingKey::from_secret(raw),
			access_ttl,
			refresh_ttl,
		}
	}

	/// Access token lifetime.
	pub fn access_ttl(&self) -> Duration {
		self.access_ttl
	}

	/// Refresh token lifetime.
	pub fn refresh_ttl(&self) -> Duration {
		self.refresh_ttl
	}

	/// Mints a fresh pair for `account` issued at `now`.
	pub fn mint(&self, account: AccountId, now: OffsetDateTime) -> Result<TokenPair, SigningError> {
		let access = SessionClaims::new(account, TokenUse::Access, now, self.access_ttl);
		let refresh = SessionClaims::new(account, TokenUse::Refresh, now, self.refresh_ttl);

		Ok(TokenPair { access_token: self.sign(&access)?, refresh_token: self.sign(&refresh)? })
	}

	/// Signs one claim set.
	pub fn sign(&self, claims: &SessionClaims) -> Result<TokenSecret, SigningError> {
		jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
			.map(TokenSecret::from)
			.map_err(|source| SigningError { kind: claims.typ.as_str(), source })
	}

	/// Verifies `token` as the `expected` half; `check_expiry = false` accepts expired tokens.
	pub fn verify(
		&self,
		token: &TokenSecret,
		expected: TokenUse,
		check_expiry: bool,
	) -> Result<SessionClaims, TokenRejection> {
		let mut validation = Validation::new(Algorithm::HS256);

		validation.leeway = 0;
		validation.validate_exp = check_expiry;
		validation.validate_aud = false;
		validation.set_required_spec_claims(&["exp", "sub"]);

		let claims =
			jsonwebtoken::decode::<SessionClaims>(token.expose(), &self.decoding, &validation)
				.map_err(|e| match e.kind() {
					JwtErrorKind::ExpiredSignature => TokenRejection::Expired,
					_ => TokenRejection::Invalid(e),
				})?
				.claims;

		if claims.typ != expected {
			return Err(TokenRejection::WrongUse { expected, actual: claims.typ });
		}

		Ok(claims)
	}
}
impl Debug for TokenSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenSigner")
			.field("access_ttl", &self.access_ttl)
			.field("refresh_ttl", &self.refresh_ttl)
			.finish_non_exhaustive()
	}
}
