//! Shared fixtures for integration tests: an insecure reqwest transport for `httpmock`, a
//! gateway wired to in-memory stores, and RSA-signed ID token helpers.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use social_auth_gateway::{
	Gateway,
	config::{GatewayConfig, GatewayConfigBuilder},
	http::ReqwestHttpClient,
	jsonwebtoken::{self, Algorithm, EncodingKey, Header},
	reqwest::Client,
	store::{MemoryAccountStore, MemorySessionStore},
	url::Url,
};

pub const SIGNING_SECRET: &str = "integration-secret-0123456789abcdef";
pub const KEY_ID: &str = "test-key-1";
pub const GOOGLE_WEB_CLIENT: &str = "web-client.apps.googleusercontent.com";
pub const APPLE_CLIENT: &str = "com.example.reader";
pub const GOOGLE_ISSUER: &str = "https://accounts.google.com";
pub const APPLE_ISSUER: &str = "https://appleid.apple.com";

pub const KAKAO_PATH: &str = "/v2/user/me";
pub const NAVER_PATH: &str = "/v1/nid/me";
pub const GOOGLE_JWKS_PATH: &str = "/oauth2/v3/certs";
pub const APPLE_JWKS_PATH: &str = "/auth/keys";

const SIGNING_KEY: &[u8] = include_bytes!("../fixtures/signing_key.pem");
const ROGUE_KEY: &[u8] = include_bytes!("../fixtures/rogue_key.pem");
const JWKS: &str = include_str!("../fixtures/jwks.json");

pub type TestGateway = Gateway<ReqwestHttpClient>;

pub struct Harness {
	pub gateway: TestGateway,
	pub accounts: Arc<MemoryAccountStore>,
	pub sessions: Arc<MemorySessionStore>,
}

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock` during tests.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

pub fn url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path)).expect("Mock endpoint should parse successfully.")
}

/// Builder with every provider endpoint pointed at `server`.
pub fn config_builder(server: &MockServer) -> GatewayConfigBuilder {
	GatewayConfig::builder(SIGNING_SECRET)
		.google_client_ids(
			GOOGLE_WEB_CLIENT,
			"android-client.apps.googleusercontent.com",
			"ios-client.apps.googleusercontent.com",
		)
		.apple_client_id(APPLE_CLIENT)
		.kakao_user_info_url(url(server, KAKAO_PATH))
		.naver_user_info_url(url(server, NAVER_PATH))
		.google_jwks_url(url(server, GOOGLE_JWKS_PATH))
		.apple_jwks_url(url(server, APPLE_JWKS_PATH))
}

pub fn config(server: &MockServer) -> GatewayConfig {
	config_builder(server)
		.build()
		.expect("Gateway configuration should validate against the mock server.")
}

pub fn harness_with(config: GatewayConfig) -> Harness {
	let accounts = Arc::new(MemoryAccountStore::default());
	let sessions = Arc::new(MemorySessionStore::default());
	let gateway: TestGateway = Gateway::with_http_client(
		config,
		accounts.clone(),
		sessions.clone(),
		test_reqwest_http_client(),
	)
	.expect("Gateway should build from a valid configuration.");

	Harness { gateway, accounts, sessions }
}

pub fn harness(server: &MockServer) -> Harness {
	harness_with(config(server))
}

pub async fn mock_jwks<'a>(server: &'a MockServer, path: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(GET).path(path);
			then.status(200).header("content-type", "application/json").body(JWKS);
		})
		.await
}

pub fn now() -> i64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.expect("System clock should be after the Unix epoch.")
		.as_secs() as i64
}

pub fn google_claims(sub: &str) -> Value {
	json!({
		"iss": GOOGLE_ISSUER,
		"aud": GOOGLE_WEB_CLIENT,
		"sub": sub,
		"iat": now(),
		"exp": now() + 3_600,
		"email": "reader@example.com",
	})
}

pub fn apple_claims(sub: &str) -> Value {
	json!({
		"iss": APPLE_ISSUER,
		"aud": APPLE_CLIENT,
		"sub": sub,
		"iat": now(),
		"exp": now() + 3_600,
	})
}

fn sign(claims: &Value, kid: &str, pem: &[u8]) -> String {
	let mut header = Header::new(Algorithm::RS256);

	header.kid = Some(kid.to_owned());

	let key = EncodingKey::from_rsa_pem(pem).expect("Fixture RSA key should load.");

	jsonwebtoken::encode(&header, claims, &key).expect("Fixture ID token should sign.")
}

/// Signs `claims` with the key published in the fixture JWKS.
pub fn id_token(claims: &Value) -> String {
	sign(claims, KEY_ID, SIGNING_KEY)
}

/// Signs `claims` under a custom key id with the published key.
pub fn id_token_with_kid(claims: &Value, kid: &str) -> String {
	sign(claims, kid, SIGNING_KEY)
}

/// Signs `claims` with a key that is not published, reusing the published key id.
pub fn forged_id_token(claims: &Value) -> String {
	sign(claims, KEY_ID, ROGUE_KEY)
}
