//! Strongly typed identifiers enforced across the gateway domain.

// std
use std::{borrow::Borrow, ops::Deref};
// crates.io
use uuid::Uuid;
// self
use crate::_prelude::*;

// Shared string-view impls; each type supplies its own validating `new`.
macro_rules! string_newtype {
	($name:ident, $label:literal) => {
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($label, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
	};
}

const SUBJECT_MAX_BYTES: usize = 255;
const NICKNAME_MAX_CHARS: usize = 20;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty or whitespace.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (subject, nickname, account).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier (subject, nickname, account).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier (subject, nickname, account).
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// The identifier is not a valid UUID.
	#[error("{kind} identifier is not a valid UUID.")]
	Malformed {
		/// Kind of identifier (subject, nickname, account).
		kind: &'static str,
	},
}

/// Stable user identifier issued by a social provider.
///
/// Kakao ids arrive as numbers and are kept in their decimal form; every other provider
/// issues opaque strings. Comparison is exact.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubjectId(String);
impl SubjectId {
	/// Validates a provider subject: non-empty, no whitespace, at most 255 bytes.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		if view.is_empty() {
			return Err(IdentifierError::Empty { kind: "Subject" });
		}
		if view.chars().any(char::is_whitespace) {
			return Err(IdentifierError::ContainsWhitespace { kind: "Subject" });
		}
		if view.len() > SUBJECT_MAX_BYTES {
			return Err(IdentifierError::TooLong { kind: "Subject", max: SUBJECT_MAX_BYTES });
		}

		Ok(Self(view.to_owned()))
	}
}
string_newtype!(SubjectId, "Subject");

/// Social identity providers the gateway accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderKind {
	/// Kakao (opaque bearer access token).
	Kakao,
	/// Naver (opaque bearer access token).
	Naver,
	/// Google (signed ID token).
	Google,
	/// Apple (signed ID token).
	Apple,
}
impl ProviderKind {
	/// Every supported provider, in declaration order.
	pub const ALL: [ProviderKind; 4] = [Self::Kakao, Self::Naver, Self::Google, Self::Apple];

	/// Returns the canonical upper-case label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Kakao => "KAKAO",
			Self::Naver => "NAVER",
			Self::Google => "GOOGLE",
			Self::Apple => "APPLE",
		}
	}

	/// Returns `true` for providers that issue signed ID tokens.
	pub const fn uses_id_token(self) -> bool {
		matches!(self, Self::Google | Self::Apple)
	}
}
impl Display for ProviderKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ProviderKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let name = s.trim();

		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str().eq_ignore_ascii_case(name))
			.ok_or(Error::InvalidProvider)
	}
}

/// Opaque, generated identifier of a local account.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);
impl AccountId {
	/// Generates a fresh random identifier.
	pub fn generate() -> Self {
		Self(Uuid::new_v4())
	}

	/// Wraps an existing UUID.
	pub fn from_uuid(value: Uuid) -> Self {
		Self(value)
	}

	/// Returns the inner UUID.
	pub fn as_uuid(&self) -> &Uuid {
		&self.0
	}
}
impl Debug for AccountId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Account({})", self.0)
	}
}
impl Display for AccountId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		Display::fmt(&self.0, f)
	}
}
impl FromStr for AccountId {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Uuid::parse_str(s).map(Self).map_err(|_| IdentifierError::Malformed { kind: "Account" })
	}
}

/// Display name shown to other users; unique among active accounts.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);
impl Nickname {
	/// Creates a nickname after trimming and length validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref().trim();

		if view.is_empty() {
			return Err(IdentifierError::Empty { kind: "Nickname" });
		}
		if view.chars().count() > NICKNAME_MAX_CHARS {
			return Err(IdentifierError::TooLong { kind: "Nickname", max: NICKNAME_MAX_CHARS });
		}

		Ok(Self(view.to_owned()))
	}
}
string_newtype!(Nickname, "Nickname");
