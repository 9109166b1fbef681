#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
// self
use common::*;
use social_auth_gateway::{LoginOutcome, auth::TokenSecret, error::Error};

async fn login(h: &Harness, subject: &str) -> LoginOutcome {
	h.gateway
		.login("GOOGLE", subject, &TokenSecret::new(id_token(&google_claims(subject))))
		.await
		.expect("Google login should succeed.")
}

#[tokio::test]
async fn reissue_rotates_the_pair_exactly_once() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let outcome = login(&h, "1234").await;
	let old = outcome.tokens;
	let new = h
		.gateway
		.reissue(&old.access_token, &old.refresh_token)
		.await
		.expect("The first reissue should succeed.");

	assert_ne!(new.access_token, old.access_token);
	assert_ne!(new.refresh_token, old.refresh_token);
	assert_eq!(
		h.gateway.authenticate(&new.access_token).await.expect("New access token should verify."),
		outcome.account_id
	);

	let err = h
		.gateway
		.reissue(&old.access_token, &old.refresh_token)
		.await
		.expect_err("Replaying a rotated refresh token should fail.");

	assert!(matches!(err, Error::InvalidRefreshToken));

	h.gateway
		.reissue(&new.access_token, &new.refresh_token)
		.await
		.expect("The rotated pair should reissue again.");

	let metrics = h.gateway.sessions().reissue_metrics();

	assert_eq!(metrics.attempts(), 3);
	assert_eq!(metrics.successes(), 2);
	assert_eq!(metrics.failures(), 1);
	assert_eq!(metrics.replays(), 1);
}

#[tokio::test]
async fn concurrent_reissues_have_one_winner() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let pair = login(&h, "1234").await.tokens;
	let (left, right) = tokio::join!(
		h.gateway.reissue(&pair.access_token, &pair.refresh_token),
		h.gateway.reissue(&pair.access_token, &pair.refresh_token),
	);

	assert_eq!(left.is_ok() as u8 + right.is_ok() as u8, 1);
	assert!(
		matches!(left, Err(Error::InvalidRefreshToken)) ||
			matches!(right, Err(Error::InvalidRefreshToken))
	);
}

#[tokio::test]
async fn a_new_login_supersedes_the_previous_session() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let first = login(&h, "1234").await.tokens;
	let second = login(&h, "1234").await.tokens;
	let err = h
		.gateway
		.reissue(&first.access_token, &first.refresh_token)
		.await
		.expect_err("The superseded pair should not reissue.");

	assert!(matches!(err, Error::InvalidRefreshToken));
	assert_eq!(h.sessions.len(), 1);

	h.gateway
		.reissue(&second.access_token, &second.refresh_token)
		.await
		.expect("The latest pair should reissue.");
}

#[tokio::test]
async fn pairs_cannot_be_mixed_across_accounts() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let alice = login(&h, "alice").await.tokens;
	let bob = login(&h, "bob").await.tokens;

	assert!(matches!(
		h.gateway.reissue(&alice.access_token, &bob.refresh_token).await,
		Err(Error::InvalidRefreshToken)
	));
	assert!(matches!(
		h.gateway.reissue(&TokenSecret::new("forged"), &bob.refresh_token).await,
		Err(Error::InvalidAccessToken)
	));
	assert!(matches!(
		h.gateway.authenticate(&bob.refresh_token).await,
		Err(Error::InvalidAccessToken)
	));
}

#[tokio::test]
async fn logout_is_idempotent_and_ends_the_session() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let outcome = login(&h, "1234").await;
	let account = h
		.gateway
		.authenticate(&outcome.tokens.access_token)
		.await
		.expect("Fresh access tokens should authenticate.");

	h.gateway.logout(account).await.expect("Logout should succeed.");
	h.gateway.logout(account).await.expect("Repeated logout should succeed.");

	assert!(h.sessions.is_empty());

	let err = h
		.gateway
		.reissue(&outcome.tokens.access_token, &outcome.tokens.refresh_token)
		.await
		.expect_err("Reissue after logout should fail.");

	assert!(matches!(err, Error::InvalidRefreshToken));
}
