//! Session token service: issue, rotate, revoke, and check gateway-minted token pairs.
//!
//! Only the refresh token is persisted, under `refresh:{account_id}` with a TTL equal to its
//! validity. Issuing overwrites the entry, so a newer login supersedes older sessions. Reissue
//! swaps the entry with a compare-and-swap against the presented refresh token; of two
//! concurrent reissues with the same token exactly one wins and the other sees
//! [`Error::InvalidRefreshToken`].

mod metrics;
mod signer;

pub use metrics::ReissueMetrics;
pub use signer::{TokenRejection, TokenSigner};

// self
use crate::{
	_prelude::*,
	auth::{AccountId, TokenPair, TokenSecret, TokenUse},
	config::SessionConfig,
	obs,
	store::{CompareAndSwapOutcome, SessionKey, SessionStore},
};

/// Issues and rotates session token pairs against a [`SessionStore`].
pub struct SessionTokenService {
	signer: TokenSigner,
	store: Arc<dyn SessionStore>,
	reissue_metrics: ReissueMetrics,
}
impl SessionTokenService {
	/// Creates a service signing with `config` and persisting into `store`.
	pub fn new(config: &SessionConfig, store: Arc<dyn SessionStore>) -> Self {
		Self {
			signer: TokenSigner::new(&config.signing_secret, config.access_ttl, config.refresh_ttl),
			store,
			reissue_metrics: ReissueMetrics::default(),
		}
	}

	/// Signer used for minting and verification.
	pub fn signer(&self) -> &TokenSigner {
		&self.signer
	}

	/// In-process reissue counters.
	pub fn reissue_metrics(&self) -> &ReissueMetrics {
		&self.reissue_metrics
	}

	/// Mints a pair for `account` and makes its refresh token the only live one.
	pub async fn issue(&self, account: AccountId) -> Result<TokenPair> {
		let pair = self.signer.mint(account, OffsetDateTime::now_utc())?;
		let key = SessionKey::for_account(account);

		self.store.set(&key, &pair.refresh_token, self.signer.refresh_ttl()).await?;

		Ok(pair)
	}

	/// Exchanges a previously issued pair for a new one.
	///
	/// The access token must carry a valid signature but may be expired. The refresh token
	/// must verify, belong to the same account, and match the stored entry exactly.
	pub async fn reissue(&self, access: &TokenSecret, refresh: &TokenSecret) -> Result<TokenPair> {
		self.reissue_metrics.record_attempt();

		let result = self.rotate(access, refresh).await;

		self.reissue_metrics.record_result(&result);

		result
	}

	/// Deletes the stored refresh token; succeeds when none exists.
	pub async fn revoke(&self, account: AccountId) -> Result<()> {
		self.store.delete(&SessionKey::for_account(account)).await?;

		Ok(())
	}

	/// Fully verifies an access token, expiry included, and returns its account.
	pub async fn authenticate(&self, access: &TokenSecret) -> Result<AccountId> {
		match self.signer.verify(access, TokenUse::Access, true) {
			Ok(claims) => Ok(claims.sub),
			Err(TokenRejection::Expired) => Err(Error::AccessTokenExpired),
			Err(e) => {
				obs::log_rejection("access_token", &access.fingerprint(), &e);

				Err(Error::InvalidAccessToken)
			},
		}
	}

	async fn rotate(&self, access: &TokenSecret, refresh: &TokenSecret) -> Result<TokenPair> {
		let access_claims = self.signer.verify(access, TokenUse::Access, false).map_err(|e| {
			obs::log_rejection("access_token", &access.fingerprint(), &e);

			Error::InvalidAccessToken
		})?;
		let reject_refresh = |reason: &dyn Display| {
			obs::log_rejection("refresh_token", &refresh.fingerprint(), reason);

			Error::InvalidRefreshToken
		};
		let refresh_claims =
			self.signer.verify(refresh, TokenUse::Refresh, true).map_err(|e| reject_refresh(&e))?;

		if refresh_claims.sub != access_claims.sub {
			return Err(reject_refresh(&"refresh token belongs to another account"));
		}

		let account = access_claims.sub;
		let key = SessionKey::for_account(account);
		let pair = self.signer.mint(account, OffsetDateTime::now_utc())?;
		let outcome = self
			.store
			.compare_and_swap(&key, refresh, &pair.refresh_token, self.signer.refresh_ttl())
			.await?;

		match outcome {
			CompareAndSwapOutcome::Updated => Ok(pair),
			CompareAndSwapOutcome::Mismatch => {
				self.reissue_metrics.record_replay();

				Err(reject_refresh(&"refresh token was superseded or replayed"))
			},
			CompareAndSwapOutcome::Missing => {
				self.reissue_metrics.record_replay();

				Err(reject_refresh(&"no live session for account"))
			},
		}
	}
}
impl Debug for SessionTokenService {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTokenService")
			.field("signer", &self.signer)
			.field("reissue_metrics", &self.reissue_metrics)
			.finish_non_exhaustive()
	}
}
