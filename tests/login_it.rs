#![cfg(feature = "reqwest")]

mod common;

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use common::*;
use social_auth_gateway::{
	auth::{ProviderKind, TokenSecret},
	config::GatewayConfig,
	error::{Error, TransportError, UnavailableError},
	time::Duration,
};

#[tokio::test]
async fn google_id_token_logs_in_and_reuses_the_account() {
	let server = MockServer::start_async().await;
	let jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let token = TokenSecret::new(id_token(&google_claims("1234")));
	let first =
		h.gateway.login("GOOGLE", "1234", &token).await.expect("Google login should succeed.");
	let second =
		h.gateway.login("google", "1234", &token).await.expect("Repeated login should succeed.");

	assert_eq!(first.account_id, second.account_id);
	assert_eq!(first.nickname, second.nickname);
	assert_ne!(first.tokens, second.tokens);
	assert_eq!(h.accounts.accounts().len(), 1);
	assert_eq!(h.sessions.len(), 1);
	// Google key sets are cached, so the second login verifies offline.
	jwks.assert_calls_async(1).await;
}

#[tokio::test]
async fn google_subject_must_match_the_claim() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let token = TokenSecret::new(id_token(&google_claims("9999")));
	let err = h
		.gateway
		.login("GOOGLE", "1234", &token)
		.await
		.expect_err("A token for another subject should be rejected.");

	assert!(matches!(err, Error::ProviderSubjectMismatch));
	assert!(h.accounts.accounts().is_empty());
	assert!(h.sessions.is_empty());
}

#[tokio::test]
async fn google_accepts_every_configured_client_id() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);
	let mut claims = google_claims("ios-user");

	claims["aud"] = json!(["someone-else", "ios-client.apps.googleusercontent.com"]);

	h.gateway
		.login("GOOGLE", "ios-user", &TokenSecret::new(id_token(&claims)))
		.await
		.expect("An audience list containing a configured client id should be accepted.");
}

#[tokio::test]
async fn apple_id_token_logs_in() {
	let server = MockServer::start_async().await;
	let jwks = mock_jwks(&server, APPLE_JWKS_PATH).await;
	let h = harness(&server);
	let token = TokenSecret::new(id_token(&apple_claims("001234.abcd")));
	let outcome =
		h.gateway.login("APPLE", "001234.abcd", &token).await.expect("Apple login should succeed.");

	h.gateway.login("APPLE", "001234.abcd", &token).await.expect("Repeated login should succeed.");

	assert_eq!(h.accounts.accounts()[0].id, outcome.account_id);
	// Apple key sets are not cached by default.
	jwks.assert_calls_async(2).await;
}

#[tokio::test]
async fn apple_rejects_tampered_or_foreign_tokens() {
	let server = MockServer::start_async().await;
	let _jwks = mock_jwks(&server, APPLE_JWKS_PATH).await;
	let h = harness(&server);
	let mut wrong_audience = apple_claims("5678");
	let mut wrong_issuer = apple_claims("5678");
	let mut expired = apple_claims("5678");

	wrong_audience["aud"] = json!("com.example.other");
	wrong_issuer["iss"] = json!(GOOGLE_ISSUER);
	expired["exp"] = json!(now() - 3_600);

	let cases = [
		("unknown key id", id_token_with_kid(&apple_claims("5678"), "rotated-away")),
		("unpublished signing key", forged_id_token(&apple_claims("5678"))),
		("audience mismatch", id_token(&wrong_audience)),
		("issuer mismatch", id_token(&wrong_issuer)),
		("expired", id_token(&expired)),
		("not a jwt", "definitely-not-a-jwt".to_owned()),
	];

	for (case, token) in cases {
		let err = h
			.gateway
			.login("APPLE", "5678", &TokenSecret::new(token))
			.await
			.expect_err("Tampered Apple tokens should be rejected.");

		assert!(matches!(err, Error::InvalidSocialToken), "{case} should be rejected: {err:?}");
	}

	assert!(h.accounts.accounts().is_empty());
}

#[tokio::test]
async fn unknown_key_ids_do_not_refetch_a_fresh_set() {
	let server = MockServer::start_async().await;
	let jwks = mock_jwks(&server, GOOGLE_JWKS_PATH).await;
	let h = harness(&server);

	h.gateway
		.login("GOOGLE", "1234", &TokenSecret::new(id_token(&google_claims("1234"))))
		.await
		.expect("Google login should succeed.");

	let rotated = TokenSecret::new(id_token_with_kid(&google_claims("1234"), "next-key"));
	let err = h
		.gateway
		.login("GOOGLE", "1234", &rotated)
		.await
		.expect_err("Keys absent from the published set should be rejected.");

	assert!(matches!(err, Error::InvalidSocialToken));
	// The set was downloaded moments ago, so the unknown key id does not trigger a download.
	jwks.assert_calls_async(1).await;
}

#[tokio::test]
async fn kakao_numeric_ids_log_in() {
	let server = MockServer::start_async().await;
	let me = server
		.mock_async(|when, then| {
			when.method(GET).path(KAKAO_PATH).header("authorization", "Bearer kakao-access");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":3141592653,"connected_at":"2024-01-01T00:00:00Z"}"#);
		})
		.await;
	let h = harness(&server);
	let outcome = h
		.gateway
		.login("KAKAO", "3141592653", &TokenSecret::new("kakao-access"))
		.await
		.expect("Kakao login should succeed.");

	me.assert_calls_async(1).await;

	let account = &h.accounts.accounts()[0];

	assert_eq!(account.id, outcome.account_id);
	assert_eq!(account.provider, ProviderKind::Kakao);
}

#[tokio::test]
async fn naver_envelope_ids_log_in() {
	let server = MockServer::start_async().await;
	let _me = server
		.mock_async(|when, then| {
			when.method(GET).path(NAVER_PATH).header("authorization", "Bearer naver-access");
			then.status(200).header("content-type", "application/json").body(
				r#"{"resultcode":"00","message":"success","response":{"id":"naver-abc"}}"#,
			);
		})
		.await;
	let h = harness(&server);

	h.gateway
		.login("NAVER", "naver-abc", &TokenSecret::new("naver-access"))
		.await
		.expect("Naver login should succeed.");
}

#[tokio::test]
async fn rejected_bearer_tokens_are_invalid() {
	let server = MockServer::start_async().await;
	let _kakao = server
		.mock_async(|when, then| {
			when.method(GET).path(KAKAO_PATH);
			then.status(401).header("content-type", "application/json").body(r#"{"code":-401}"#);
		})
		.await;
	let _naver = server
		.mock_async(|when, then| {
			when.method(GET).path(NAVER_PATH);
			then.status(403).body("forbidden");
		})
		.await;
	let h = harness(&server);

	for provider in ["KAKAO", "NAVER"] {
		let err = h
			.gateway
			.login(provider, "1", &TokenSecret::new("stale"))
			.await
			.expect_err("Provider-rejected tokens should fail.");

		assert!(matches!(err, Error::InvalidSocialToken), "{provider}: {err:?}");
		assert!(!err.is_retryable());
	}
}

#[tokio::test]
async fn empty_bearer_tokens_never_reach_the_provider() {
	let server = MockServer::start_async().await;
	let me = server
		.mock_async(|when, then| {
			when.method(GET).path(KAKAO_PATH);
			then.status(200).body(r#"{"id":1}"#);
		})
		.await;
	let h = harness(&server);
	let err = h
		.gateway
		.login("KAKAO", "1", &TokenSecret::new(""))
		.await
		.expect_err("Empty tokens should be rejected.");

	assert!(matches!(err, Error::InvalidSocialToken));
	me.assert_calls_async(0).await;
}

#[tokio::test]
async fn outages_are_retryable_but_client_errors_are_not() {
	let server = MockServer::start_async().await;
	let _kakao = server
		.mock_async(|when, then| {
			when.method(GET).path(KAKAO_PATH);
			then.status(503).header("retry-after", "30").body("maintenance");
		})
		.await;
	let _naver = server
		.mock_async(|when, then| {
			when.method(GET).path(NAVER_PATH);
			then.status(429).header("retry-after", "30").body("slow down");
		})
		.await;
	let h = harness(&server);
	let err = h
		.gateway
		.login("KAKAO", "1", &TokenSecret::new("token"))
		.await
		.expect_err("A provider outage should fail the login.");

	assert!(matches!(
		err,
		Error::ProviderUnavailable(UnavailableError::Status {
			provider: ProviderKind::Kakao,
			status: 503,
			..
		})
	));
	assert!(err.is_retryable());
	assert_eq!(err.retry_after(), Some(Duration::seconds(30)));
	assert_eq!(err.code(), 5030102);

	let err = h
		.gateway
		.login("NAVER", "1", &TokenSecret::new("token"))
		.await
		.expect_err("Throttling should fail the login.");

	assert!(matches!(err, Error::InvalidSocialToken), "{err:?}");
	assert!(!err.is_retryable());
	assert_eq!(err.retry_after(), None);
}

#[tokio::test]
async fn slow_providers_time_out_as_outages() {
	let server = MockServer::start_async().await;
	let _kakao = server
		.mock_async(|when, then| {
			when.method(GET).path(KAKAO_PATH);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"id":1}"#)
				.delay(std::time::Duration::from_millis(1_500));
		})
		.await;
	let config = config_builder(&server)
		.request_timeout(Duration::milliseconds(200))
		.build()
		.expect("Configuration should validate.");
	let h = harness_with(config);
	let err = h
		.gateway
		.login("KAKAO", "1", &TokenSecret::new("token"))
		.await
		.expect_err("A provider slower than the timeout should fail the login.");

	assert!(
		matches!(
			err,
			Error::ProviderUnavailable(UnavailableError::Transport {
				provider: ProviderKind::Kakao,
				source: TransportError::Timeout,
			})
		),
		"{err:?}"
	);
	assert!(err.is_retryable());
	assert!(h.accounts.accounts().is_empty());
}

#[tokio::test]
async fn unreadable_success_bodies_are_outages() {
	let server = MockServer::start_async().await;
	let _kakao = server
		.mock_async(|when, then| {
			when.method(GET).path(KAKAO_PATH);
			then.status(200).header("content-type", "application/json").body(r#"{"nickname":"x"}"#);
		})
		.await;
	let h = harness(&server);
	let err = h
		.gateway
		.login("KAKAO", "1", &TokenSecret::new("token"))
		.await
		.expect_err("Bodies without an id should fail the login.");

	assert!(matches!(
		err,
		Error::ProviderUnavailable(UnavailableError::UnexpectedBody { .. })
	));
}

#[tokio::test]
async fn unsupported_providers_are_rejected() {
	let server = MockServer::start_async().await;
	let h = harness(&server);

	for provider in ["FACEBOOK", "", "GOOGLE+"] {
		let err = h
			.gateway
			.login(provider, "1", &TokenSecret::new("token"))
			.await
			.expect_err("Unknown providers should be rejected.");

		assert!(matches!(err, Error::InvalidProvider), "{provider:?}: {err:?}");
	}
}

#[tokio::test]
async fn unreachable_key_endpoints_are_outages() {
	let server = MockServer::start_async().await;
	let config = GatewayConfig::builder(SIGNING_SECRET)
		.apple_client_id(APPLE_CLIENT)
		.google_client_ids("web", "android", "ios")
		.apple_jwks_url(url(&server, "/missing-keys"))
		.build()
		.expect("Configuration should validate.");
	let _keys = server
		.mock_async(|when, then| {
			when.method(GET).path("/missing-keys");
			then.status(502);
		})
		.await;
	let h = harness_with(config);
	let err = h
		.gateway
		.login("APPLE", "1", &TokenSecret::new(id_token(&apple_claims("1"))))
		.await
		.expect_err("A failing key endpoint should fail the login.");

	assert!(err.is_retryable());
	assert_eq!(err.code(), 5030105);
}
