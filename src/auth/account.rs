//! Local account records and the profile edits applied to them.

// crates.io
use time::Date;
// self
use crate::{
	_prelude::*,
	auth::{AccountId, Nickname, ProviderKind, SubjectId},
};

/// Lifecycle status of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
	/// Account can log in and holds its nickname.
	Active,
	/// Account has been withdrawn.
	Inactive,
}

/// Optional self-reported gender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
	/// Female.
	Female,
	/// Male.
	Male,
}

/// Stable local identity bound to exactly one social provider account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	/// Generated identifier.
	pub id: AccountId,
	/// Display name, unique among active accounts.
	pub nickname: Nickname,
	/// Optional birth date.
	pub birth_date: Option<Date>,
	/// Optional gender.
	pub gender: Option<Gender>,
	/// Provider the account signs in with.
	pub provider: ProviderKind,
	/// Provider-issued subject; cleared on withdrawal so it can be reused.
	pub subject: Option<SubjectId>,
	/// Lifecycle status.
	pub status: AccountStatus,
}
impl Account {
	/// Creates a fresh active account for a verified provider identity.
	pub fn new(provider: ProviderKind, subject: SubjectId, nickname: Nickname) -> Self {
		Self {
			id: AccountId::generate(),
			nickname,
			birth_date: None,
			gender: None,
			provider,
			subject: Some(subject),
			status: AccountStatus::Active,
		}
	}

	/// Returns `true` while the account has not been withdrawn.
	pub fn is_active(&self) -> bool {
		matches!(self.status, AccountStatus::Active)
	}

	/// Marks the account withdrawn and releases its provider subject.
	pub fn withdraw(&mut self) {
		self.status = AccountStatus::Inactive;
		self.subject = None;
	}

	/// Applies a profile edit in place.
	pub fn apply(&mut self, update: ProfileUpdate) {
		if let Some(nickname) = update.nickname {
			self.nickname = nickname;
		}

		update.birth_date.apply_to(&mut self.birth_date);
		update.gender.apply_to(&mut self.gender);
	}

	/// Public profile view of the account.
	pub fn profile(&self) -> Profile {
		Profile {
			nickname: self.nickname.clone(),
			birth_date: self.birth_date,
			gender: self.gender,
		}
	}
}

/// Tri-state field edit: leave untouched, clear, or replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Patch<T> {
	/// Keep the current value.
	Keep,
	/// Remove the current value.
	Clear,
	/// Replace the current value.
	Set(T),
}
impl<T> Default for Patch<T> {
	fn default() -> Self {
		Self::Keep
	}
}
impl<T> Patch<T> {
	/// Writes the edit into `slot`.
	pub fn apply_to(self, slot: &mut Option<T>) {
		match self {
			Self::Keep => {},
			Self::Clear => *slot = None,
			Self::Set(value) => *slot = Some(value),
		}
	}
}

/// Profile edit request; nickname cannot be cleared, only replaced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
	/// New nickname, if changing.
	pub nickname: Option<Nickname>,
	/// Birth date edit.
	pub birth_date: Patch<Date>,
	/// Gender edit.
	pub gender: Patch<Gender>,
}

/// Profile fields exposed to the account owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
	/// Display name.
	pub nickname: Nickname,
	/// Optional birth date.
	pub birth_date: Option<Date>,
	/// Optional gender.
	pub gender: Option<Gender>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn account() -> Account {
		Account::new(
			ProviderKind::Naver,
			SubjectId::new("naver-1").expect("Subject fixture should be valid."),
			Nickname::new("TidyOwl12").expect("Nickname fixture should be valid."),
		)
	}

	#[test]
	fn withdraw_releases_subject() {
		let mut account = account();

		account.withdraw();

		assert_eq!(account.status, AccountStatus::Inactive);
		assert!(account.subject.is_none());
		assert!(!account.is_active());
	}

	#[test]
	fn patches_keep_clear_and_set() {
		let mut account = account();

		account.apply(ProfileUpdate {
			birth_date: Patch::Set(macros::date!(1994 - 03 - 21)),
			gender: Patch::Set(Gender::Female),
			..Default::default()
		});

		assert_eq!(account.birth_date, Some(macros::date!(1994 - 03 - 21)));
		assert_eq!(account.gender, Some(Gender::Female));

		account.apply(ProfileUpdate { gender: Patch::Clear, ..Default::default() });

		assert_eq!(account.birth_date, Some(macros::date!(1994 - 03 - 21)));
		assert_eq!(account.gender, None);
		assert_eq!(account.nickname.as_ref(), "TidyOwl12");
	}
}
