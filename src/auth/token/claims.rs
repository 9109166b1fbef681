//! Claim sets carried by gateway-issued session tokens.

// crates.io
use uuid::Uuid;
// self
use crate::{_prelude::*, auth::AccountId};

/// Which half of a session pair a token represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
	/// Presented on every protected request.
	Access,
	/// Exchanged only for a new pair.
	Refresh,
}
impl TokenUse {
	/// Returns a stable label suitable for logs and errors.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Access => "access",
			Self::Refresh => "refresh",
		}
	}
}
impl Display for TokenUse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// JWT claims for session tokens; `sub` is always the account id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
	/// Account id.
	pub sub: AccountId,
	/// Issued-at (unix seconds).
	pub iat: i64,
	/// Expiry (unix seconds).
	pub exp: i64,
	/// Random token id so pairs minted in the same second still differ.
	pub jti: Uuid,
	/// Token half.
	pub typ: TokenUse,
}
impl SessionClaims {
	/// Builds claims valid from `issued_at` for `ttl`.
	pub fn new(sub: AccountId, typ: TokenUse, issued_at: OffsetDateTime, ttl: Duration) -> Self {
		Self {
			sub,
			iat: issued_at.unix_timestamp(),
			exp: (issued_at + ttl).unix_timestamp(),
			jti: Uuid::new_v4(),
			typ,
		}
	}

	/// Seconds of validity left at `now`, floored at zero.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Duration {
		let remaining = Duration::seconds(self.exp - now.unix_timestamp());

		if remaining.is_negative() { Duration::ZERO } else { remaining }
	}
}
