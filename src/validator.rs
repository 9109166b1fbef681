//! Token validator: routes a claimed provider credential to its verifier and cross-checks the
//! claimed subject against the verified one.

// self
use crate::{
	_prelude::*,
	auth::{ProviderKind, SubjectId, TokenSecret},
	http::ProviderHttpClient,
	obs,
	provider::ProviderRegistry,
};

/// External identity proven by a provider verifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerifiedIdentity {
	/// Provider that vouched for the subject.
	pub provider: ProviderKind,
	/// Provider-issued subject.
	pub subject: SubjectId,
}

/// Validates login credentials against the registered provider verifiers.
#[derive(Debug)]
pub struct TokenValidator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	registry: ProviderRegistry<C>,
}
impl<C> TokenValidator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Wraps a populated registry.
	pub fn new(registry: ProviderRegistry<C>) -> Self {
		Self { registry }
	}

	/// Registry consulted for verifier lookups.
	pub fn registry(&self) -> &ProviderRegistry<C> {
		&self.registry
	}

	/// Verifies `token` for `claimed_provider` and checks it belongs to `claimed_subject`.
	///
	/// The provider name is trimmed and matched case-insensitively. Unknown or unregistered
	/// providers fail with [`Error::InvalidProvider`]; a token proving a different subject fails
	/// with [`Error::ProviderSubjectMismatch`].
	pub async fn validate(
		&self,
		claimed_provider: &str,
		claimed_subject: &str,
		token: &TokenSecret,
	) -> Result<VerifiedIdentity> {
		let provider = ProviderKind::from_str(claimed_provider)?;
		let verifier = self.registry.get(provider).ok_or(Error::InvalidProvider)?;
		let subject = verifier.verify(token).await?;

		if subject.as_ref() != claimed_subject {
			obs::log_rejection(
				provider.as_str(),
				&token.fingerprint(),
				&"verified subject differs from the claimed subject",
			);

			return Err(Error::ProviderSubjectMismatch);
		}

		Ok(VerifiedIdentity { provider, subject })
	}
}
