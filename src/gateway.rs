//! Gateway orchestrator sequencing validation, identity resolution, and session issuance.
//!
//! [`Gateway`] owns every collaborator the public use cases need: the token validator with
//! its provider registry, the identity resolver, the session token service, and the account
//! store. Each operation runs inside a [`FlowSpan`] and records attempt/success/failure
//! counters the same way.

// self
use crate::{
	_prelude::*,
	auth::{Account, AccountId, Nickname, Profile, ProfileUpdate, TokenPair, TokenSecret},
	config::GatewayConfig,
	http::ProviderHttpClient,
	identity::{IdentityResolver, NicknameSource, RandomNickname},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderRegistry,
	session::SessionTokenService,
	store::{AccountStore, SessionStore, StoreError, WriteOutcome},
	validator::TokenValidator,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestHttpClient>;

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
	/// Account the credential resolved to.
	pub account_id: AccountId,
	/// Fresh session pair; transports ship it in dedicated headers.
	pub tokens: TokenPair,
	/// Display name of the account.
	pub nickname: Nickname,
}
impl LoginOutcome {
	/// Response body carrying only the display name.
	pub fn body(&self) -> LoginBody {
		LoginBody { nickname: self.nickname.clone() }
	}
}

/// Login response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginBody {
	/// Display name of the account.
	pub nickname: Nickname,
}

/// Social login gateway: login, reissue, logout, plus the member operations built on them.
pub struct Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	config: GatewayConfig,
	validator: TokenValidator<C>,
	identities: IdentityResolver,
	sessions: SessionTokenService,
	accounts: Arc<dyn AccountStore>,
}
impl<C> Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates a gateway that reaches providers through `http_client`.
	///
	/// Fails with [`Error::Config`] when `config` does not validate.
	pub fn with_http_client(
		config: GatewayConfig,
		accounts: Arc<dyn AccountStore>,
		sessions: Arc<dyn SessionStore>,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		config.validate()?;

		let registry = ProviderRegistry::from_config(&config, http_client.into());

		Ok(Self::with_registry(config, accounts, sessions, registry))
	}

	/// Creates a gateway around a caller-assembled registry; `config` is trusted as given.
	pub fn with_registry(
		config: GatewayConfig,
		accounts: Arc<dyn AccountStore>,
		sessions: Arc<dyn SessionStore>,
		registry: ProviderRegistry<C>,
	) -> Self {
		let identities = IdentityResolver::new(
			accounts.clone(),
			Arc::new(RandomNickname),
			config.nickname_attempts,
		);
		let sessions = SessionTokenService::new(&config.session, sessions);

		Self { validator: TokenValidator::new(registry), identities, sessions, accounts, config }
	}

	/// Replaces the display-name source used when creating accounts.
	pub fn with_nickname_source(mut self, source: Arc<dyn NicknameSource>) -> Self {
		self.identities =
			IdentityResolver::new(self.accounts.clone(), source, self.config.nickname_attempts);

		self
	}

	/// Configuration the gateway was built with.
	pub fn config(&self) -> &GatewayConfig {
		&self.config
	}

	/// Session token service, exposed for reissue counters and signer access.
	pub fn sessions(&self) -> &SessionTokenService {
		&self.sessions
	}

	/// Logs in with a provider credential, creating the account on first sight.
	pub async fn login(
		&self,
		claimed_provider: &str,
		claimed_subject: &str,
		social_token: &TokenSecret,
	) -> Result<LoginOutcome> {
		observe(FlowKind::Login, "login", |span| async move {
			let identity =
				self.validator.validate(claimed_provider, claimed_subject, social_token).await?;
			let account = self.identities.resolve(&identity).await?;

			span.record_account(account.id);

			let tokens = self.sessions.issue(account.id).await?;

			Ok(LoginOutcome { account_id: account.id, tokens, nickname: account.nickname })
		})
		.await
	}

	/// Rotates a previously issued pair.
	pub async fn reissue(&self, access: &TokenSecret, refresh: &TokenSecret) -> Result<TokenPair> {
		observe(FlowKind::Reissue, "reissue", |_| self.sessions.reissue(access, refresh)).await
	}

	/// Revokes the session of an authenticated account; repeated calls succeed.
	pub async fn logout(&self, account: AccountId) -> Result<()> {
		observe(FlowKind::Logout, "logout", |span| {
			span.record_account(account);

			self.sessions.revoke(account)
		})
		.await
	}

	/// Checks an access token on a protected request and returns its account.
	pub async fn authenticate(&self, access: &TokenSecret) -> Result<AccountId> {
		observe(FlowKind::Authenticate, "authenticate", |span| async move {
			let account = self.sessions.authenticate(access).await?;

			span.record_account(account);

			Ok(account)
		})
		.await
	}

	/// Profile of an active account.
	pub async fn profile(&self, account: AccountId) -> Result<Profile> {
		observe(FlowKind::Profile, "profile", |span| async move {
			span.record_account(account);

			Ok(self.active_account(account).await?.profile())
		})
		.await
	}

	/// Applies a profile edit; a nickname held by another active account is a conflict.
	pub async fn edit_profile(&self, account: AccountId, update: ProfileUpdate) -> Result<Profile> {
		observe(FlowKind::Profile, "edit_profile", |span| async move {
			span.record_account(account);

			let mut record = self.active_account(account).await?;

			record.apply(update);

			match self.accounts.update(record.clone()).await? {
				WriteOutcome::Stored => Ok(record.profile()),
				WriteOutcome::NicknameTaken => Err(Error::NicknameConflict),
				WriteOutcome::Missing => Err(Error::AccountNotFound),
				WriteOutcome::SubjectTaken => Err(unexpected_conflict()),
			}
		})
		.await
	}

	/// Returns `true` when no active account holds `nickname`.
	pub async fn nickname_available(&self, nickname: &Nickname) -> Result<bool> {
		observe(FlowKind::Profile, "nickname_available", |_| self.identities.is_available(nickname))
			.await
	}

	/// Withdraws an account: its session is revoked, its nickname and provider subject freed.
	pub async fn withdraw(&self, account: AccountId) -> Result<()> {
		observe(FlowKind::Withdraw, "withdraw", |span| async move {
			span.record_account(account);

			let mut record = self.active_account(account).await?;

			self.sessions.revoke(account).await?;
			record.withdraw();

			match self.accounts.update(record).await? {
				WriteOutcome::Stored => Ok(()),
				WriteOutcome::Missing => Err(Error::AccountNotFound),
				WriteOutcome::NicknameTaken | WriteOutcome::SubjectTaken =>
					Err(unexpected_conflict()),
			}
		})
		.await
	}

	async fn active_account(&self, account: AccountId) -> Result<Account> {
		self.accounts
			.find_by_id(account)
			.await?
			.filter(|record| record.is_active())
			.ok_or(Error::AccountNotFound)
	}
}
#[cfg(feature = "reqwest")]
impl Gateway<ReqwestHttpClient> {
	/// Creates a gateway with its own reqwest transport.
	pub fn new(
		config: GatewayConfig,
		accounts: Arc<dyn AccountStore>,
		sessions: Arc<dyn SessionStore>,
	) -> Result<Self> {
		Self::with_http_client(config, accounts, sessions, ReqwestHttpClient::new()?)
	}
}
impl<C> Debug for Gateway<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("providers", &self.validator.registry().kinds().collect::<Vec<_>>())
			.field("identities", &self.identities)
			.field("sessions", &self.sessions)
			.finish_non_exhaustive()
	}
}

// Runs one operation inside its flow span and records its attempt and outcome.
async fn observe<T, O, F>(kind: FlowKind, stage: &'static str, operation: O) -> Result<T>
where
	O: FnOnce(FlowSpan) -> F,
	F: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(operation(span.clone())).await;

	match &result {
		Ok(_) => obs::record_flow_outcome(kind, FlowOutcome::Success),
		Err(_) => obs::record_flow_outcome(kind, FlowOutcome::Failure),
	}

	result
}

fn unexpected_conflict() -> Error {
	StoreError::Backend { message: "account update violated a constraint it cannot touch".into() }
		.into()
}
