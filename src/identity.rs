//! Identity resolver: maps a verified provider identity onto a local account.
//!
//! Lookups are lock-free. Creation is serialized per `(provider, subject)` inside this process
//! with an async guard, while the account store's uniqueness constraints settle races between
//! processes: a subject conflict means someone else created the account first, so the resolver
//! re-fetches it; a nickname conflict means the drawn name was taken, so another is drawn.

pub mod nickname;

pub use nickname::{NicknameSource, RandomNickname};

// self
use crate::{
	_prelude::*,
	auth::{Account, Nickname, ProviderKind, SubjectId},
	store::{AccountStore, StoreError, WriteOutcome},
	validator::VerifiedIdentity,
};

type GuardKey = (ProviderKind, SubjectId);

/// Create-or-reuse resolution of local accounts.
pub struct IdentityResolver {
	accounts: Arc<dyn AccountStore>,
	nicknames: Arc<dyn NicknameSource>,
	max_attempts: usize,
	guards: Mutex<HashMap<GuardKey, Arc<AsyncMutex<()>>>>,
}
impl IdentityResolver {
	/// Creates a resolver drawing at most `max_attempts` names per account creation.
	pub fn new(
		accounts: Arc<dyn AccountStore>,
		nicknames: Arc<dyn NicknameSource>,
		max_attempts: usize,
	) -> Self {
		Self { accounts, nicknames, max_attempts, guards: Default::default() }
	}

	/// Returns the account bound to `identity`, creating an active one on first sight.
	pub async fn resolve(&self, identity: &VerifiedIdentity) -> Result<Account> {
		if let Some(account) = self.find(identity).await? {
			return Ok(account);
		}

		let lease = self.lease((identity.provider, identity.subject.clone()));
		let _creation = lease.mutex.lock().await;

		self.create_or_fetch(identity).await
	}

	/// Returns `true` when no active account holds `nickname`.
	pub async fn is_available(&self, nickname: &Nickname) -> Result<bool> {
		Ok(!self.accounts.nickname_taken(nickname).await?)
	}

	async fn find(&self, identity: &VerifiedIdentity) -> Result<Option<Account>> {
		Ok(self.accounts.find_by_subject(identity.provider, &identity.subject).await?)
	}

	async fn create_or_fetch(&self, identity: &VerifiedIdentity) -> Result<Account> {
		if let Some(account) = self.find(identity).await? {
			return Ok(account);
		}

		for _ in 0..self.max_attempts {
			let Ok(nickname) = Nickname::new(self.nicknames.generate()) else {
				continue;
			};

			if self.accounts.nickname_taken(&nickname).await? {
				continue;
			}

			let account = Account::new(identity.provider, identity.subject.clone(), nickname);

			match self.accounts.insert(account.clone()).await? {
				WriteOutcome::Stored => return Ok(account),
				WriteOutcome::NicknameTaken => continue,
				WriteOutcome::SubjectTaken =>
					if let Some(existing) = self.find(identity).await? {
						return Ok(existing);
					},
				WriteOutcome::Missing =>
					return Err(StoreError::Backend {
						message: "account insert reported a missing record".into(),
					}
					.into()),
			}
		}

		Err(Error::NicknameExhausted { attempts: self.max_attempts })
	}

	fn lease(&self, key: GuardKey) -> GuardLease<'_> {
		let mutex = self
			.guards
			.lock()
			.entry(key.clone())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone();

		GuardLease { guards: &self.guards, key, mutex }
	}
}
// Shared creation lock for one key; dropping the last lease removes the map entry, also when
// the resolving future is cancelled while waiting.
struct GuardLease<'a> {
	guards: &'a Mutex<HashMap<GuardKey, Arc<AsyncMutex<()>>>>,
	key: GuardKey,
	mutex: Arc<AsyncMutex<()>>,
}
impl Drop for GuardLease<'_> {
	fn drop(&mut self) {
		let mut guards = self.guards.lock();

		// The map and this lease hold the only references.
		if guards.get(&self.key).is_some_and(|mutex| Arc::strong_count(mutex) == 2) {
			guards.remove(&self.key);
		}
	}
}

impl Debug for IdentityResolver {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("IdentityResolver")
			.field("max_attempts", &self.max_attempts)
			.field("pending", &self.guards.lock().len())
			.finish_non_exhaustive()
	}
}
