//! Thread-safe in-memory store implementations for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Account, AccountId, Nickname, ProviderKind, SubjectId, TokenSecret},
	store::{
		AccountStore, CompareAndSwapOutcome, SessionKey, SessionStore, StoreFuture, WriteOutcome,
	},
};

type SessionMap = Arc<RwLock<HashMap<SessionKey, SessionEntry>>>;
type AccountMap = Arc<RwLock<HashMap<AccountId, Account>>>;

#[derive(Clone, Debug)]
struct SessionEntry {
	value: TokenSecret,
	expires_at: OffsetDateTime,
}
impl SessionEntry {
	fn new(value: TokenSecret, ttl: Duration) -> Self {
		Self { value, expires_at: OffsetDateTime::now_utc() + ttl }
	}

	fn is_live(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}
}

/// In-process session store with per-entry expiry.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionStore(SessionMap);
impl MemorySessionStore {
	/// Number of live entries; expired ones are not counted.
	pub fn len(&self) -> usize {
		let now = OffsetDateTime::now_utc();

		self.0.read().values().filter(|entry| entry.is_live(now)).count()
	}

	/// Returns `true` when no live entry exists.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn get_now(map: &SessionMap, key: &SessionKey) -> Option<TokenSecret> {
		let now = OffsetDateTime::now_utc();
		let mut guard = map.write();

		match guard.get(key) {
			Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
			Some(_) => {
				guard.remove(key);

				None
			},
			None => None,
		}
	}

	fn cas_now(
		map: &SessionMap,
		key: &SessionKey,
		expected: &TokenSecret,
		replacement: &TokenSecret,
		ttl: Duration,
	) -> CompareAndSwapOutcome {
		let now = OffsetDateTime::now_utc();
		let mut guard = map.write();
		let outcome = match guard.get(key) {
			Some(entry) if !entry.is_live(now) => CompareAndSwapOutcome::Missing,
			Some(entry) if entry.value == *expected => CompareAndSwapOutcome::Updated,
			Some(_) => CompareAndSwapOutcome::Mismatch,
			None => CompareAndSwapOutcome::Missing,
		};

		if matches!(outcome, CompareAndSwapOutcome::Updated) {
			guard.insert(key.clone(), SessionEntry::new(replacement.clone(), ttl));
		}

		outcome
	}
}
impl SessionStore for MemorySessionStore {
	fn set<'a>(
		&'a self,
		key: &'a SessionKey,
		value: &'a TokenSecret,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.0.write().insert(key.clone(), SessionEntry::new(value.clone(), ttl));

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Option<TokenSecret>> {
		Box::pin(async move { Ok(Self::get_now(&self.0, key)) })
	}

	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.0.write().remove(key);

			Ok(())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		key: &'a SessionKey,
		expected: &'a TokenSecret,
		replacement: &'a TokenSecret,
		ttl: Duration,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move { Ok(Self::cas_now(&self.0, key, expected, replacement, ttl)) })
	}
}

/// In-process account store enforcing subject and nickname uniqueness.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore(AccountMap);
impl MemoryAccountStore {
	/// Snapshot of every stored account, active or not.
	pub fn accounts(&self) -> Vec<Account> {
		self.0.read().values().cloned().collect()
	}

	fn conflict(map: &HashMap<AccountId, Account>, candidate: &Account) -> Option<WriteOutcome> {
		let others = map.values().filter(|existing| existing.id != candidate.id);

		for existing in others {
			if candidate.subject.is_some()
				&& existing.provider == candidate.provider
				&& existing.subject == candidate.subject
			{
				return Some(WriteOutcome::SubjectTaken);
			}
			if candidate.is_active()
				&& existing.is_active()
				&& existing.nickname == candidate.nickname
			{
				return Some(WriteOutcome::NicknameTaken);
			}
		}

		None
	}

	fn insert_now(map: &AccountMap, account: Account) -> WriteOutcome {
		let mut guard = map.write();

		if guard.contains_key(&account.id) {
			return WriteOutcome::SubjectTaken;
		}
		if let Some(conflict) = Self::conflict(&guard, &account) {
			return conflict;
		}

		guard.insert(account.id, account);

		WriteOutcome::Stored
	}

	fn update_now(map: &AccountMap, account: Account) -> WriteOutcome {
		let mut guard = map.write();

		if !guard.contains_key(&account.id) {
			return WriteOutcome::Missing;
		}
		if let Some(conflict) = Self::conflict(&guard, &account) {
			return conflict;
		}

		guard.insert(account.id, account);

		WriteOutcome::Stored
	}
}
impl AccountStore for MemoryAccountStore {
	fn find_by_id(&self, id: AccountId) -> StoreFuture<'_, Option<Account>> {
		Box::pin(async move { Ok(self.0.read().get(&id).cloned()) })
	}

	fn find_by_subject<'a>(
		&'a self,
		provider: ProviderKind,
		subject: &'a SubjectId,
	) -> StoreFuture<'a, Option<Account>> {
		Box::pin(async move {
			let found = self
				.0
				.read()
				.values()
				.find(|account| {
					account.provider == provider && account.subject.as_ref() == Some(subject)
				})
				.cloned();

			Ok(found)
		})
	}

	fn nickname_taken<'a>(&'a self, nickname: &'a Nickname) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let taken = self
				.0
				.read()
				.values()
				.any(|account| account.is_active() && account.nickname == *nickname);

			Ok(taken)
		})
	}

	fn insert(&self, account: Account) -> StoreFuture<'_, WriteOutcome> {
		Box::pin(async move { Ok(Self::insert_now(&self.0, account)) })
	}

	fn update(&self, account: Account) -> StoreFuture<'_, WriteOutcome> {
		Box::pin(async move { Ok(Self::update_now(&self.0, account)) })
	}
}
