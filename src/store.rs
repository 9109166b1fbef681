//! Storage contracts and built-in backends for accounts and session refresh tokens.

pub mod memory;
#[cfg(feature = "redis")] pub mod redis;

pub use memory::{MemoryAccountStore, MemorySessionStore};
#[cfg(feature = "redis")] pub use self::redis::RedisSessionStore;

// self
use crate::{
	_prelude::*,
	auth::{Account, AccountId, Nickname, ProviderKind, SubjectId, TokenSecret},
};

/// Boxed future returned by every store operation.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Volatile keyed store holding the single live refresh token per account.
///
/// Every operation must be atomic for its key; the session service relies on that instead of
/// taking locks of its own.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Writes `value` under `key`, replacing any prior entry, and expires it after `ttl`.
	fn set<'a>(
		&'a self,
		key: &'a SessionKey,
		value: &'a TokenSecret,
		ttl: Duration,
	) -> StoreFuture<'a, ()>;

	/// Returns the live value under `key`, if any.
	fn get<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Option<TokenSecret>>;

	/// Removes `key`; succeeds when nothing is stored.
	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()>;

	/// Replaces the value under `key` only if it still equals `expected`.
	fn compare_and_swap<'a>(
		&'a self,
		key: &'a SessionKey,
		expected: &'a TokenSecret,
		replacement: &'a TokenSecret,
		ttl: Duration,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Persistent account records with uniqueness enforced at write time.
///
/// Implementations must reject, atomically with the write, a second account holding the same
/// `(provider, subject)` and a second *active* account holding the same nickname.
pub trait AccountStore
where
	Self: Send + Sync,
{
	/// Loads an account by id regardless of status.
	fn find_by_id(&self, id: AccountId) -> StoreFuture<'_, Option<Account>>;

	/// Loads the account currently bound to a provider subject.
	fn find_by_subject<'a>(
		&'a self,
		provider: ProviderKind,
		subject: &'a SubjectId,
	) -> StoreFuture<'a, Option<Account>>;

	/// Returns `true` when an active account holds `nickname`.
	fn nickname_taken<'a>(&'a self, nickname: &'a Nickname) -> StoreFuture<'a, bool>;

	/// Stores a new account.
	fn insert(&self, account: Account) -> StoreFuture<'_, WriteOutcome>;

	/// Replaces an existing account record.
	fn update(&self, account: Account) -> StoreFuture<'_, WriteOutcome>;
}

/// Result of a refresh-token compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The stored value matched and was replaced.
	Updated,
	/// An entry exists but holds a different value.
	Mismatch,
	/// No live entry exists for the key.
	Missing,
}

/// Result of an account write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOutcome {
	/// The record was written.
	Stored,
	/// Another account already holds the provider subject.
	SubjectTaken,
	/// Another active account already holds the nickname.
	NicknameTaken,
	/// Update targeted an id that does not exist.
	Missing,
}

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Stored payload could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Namespaced key under which an account's refresh token lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(String);
impl SessionKey {
	const PREFIX: &'static str = "refresh:";

	/// Key for the given account.
	pub fn for_account(account: AccountId) -> Self {
		Self(format!("{}{account}", Self::PREFIX))
	}

	/// Raw key string as written to the backend.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
