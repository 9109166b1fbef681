//! Access/refresh token pair handed back to callers.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Header carrying the access token on requests and responses.
pub const ACCESS_TOKEN_HEADER: &str = "authorization";
/// Header carrying the refresh token on reissue requests and responses.
pub const REFRESH_TOKEN_HEADER: &str = "refresh-token";
/// Header carrying the provider credential on login requests.
pub const SOCIAL_TOKEN_HEADER: &str = "social-token";

/// Freshly minted session credentials; both halves are always issued together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Short-lived access token.
	pub access_token: TokenSecret,
	/// Long-lived refresh token; the only half persisted server-side.
	pub refresh_token: TokenSecret,
}
impl TokenPair {
	/// Header name/value pairs for transports that ship tokens outside the body.
	pub fn headers(&self) -> [(&'static str, &str); 2] {
		[
			(ACCESS_TOKEN_HEADER, self.access_token.expose()),
			(REFRESH_TOKEN_HEADER, self.refresh_token.expose()),
		]
	}
}
impl Debug for TokenPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenPair")
			.field("access_token", &self.access_token.fingerprint())
			.field("refresh_token", &self.refresh_token.fingerprint())
			.finish()
	}
}
