//! Redis-backed [`SessionStore`] for deployments with more than one gateway process.

// crates.io
use redis::{RedisError, Script, aio::ConnectionManager};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	store::{CompareAndSwapOutcome, SessionKey, SessionStore, StoreError, StoreFuture},
};

// Returns 1 on swap, 0 on mismatch, -1 when the key is absent or expired.
const COMPARE_AND_SWAP_LUA: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
	return -1
end
if current ~= ARGV[1] then
	return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
return 1
"#;

/// Session store persisting refresh tokens in Redis with native key expiry.
#[derive(Clone)]
pub struct RedisSessionStore {
	connection: ConnectionManager,
	compare_and_swap: Arc<Script>,
}
impl RedisSessionStore {
	/// Wraps an established connection manager.
	pub fn new(connection: ConnectionManager) -> Self {
		Self { connection, compare_and_swap: Arc::new(Script::new(COMPARE_AND_SWAP_LUA)) }
	}

	/// Opens a managed connection to `url` (for example `redis://127.0.0.1/`).
	pub async fn connect(url: &str) -> Result<Self, StoreError> {
		let client = redis::Client::open(url).map_err(backend)?;
		let connection = ConnectionManager::new(client).await.map_err(backend)?;

		Ok(Self::new(connection))
	}
}
impl Debug for RedisSessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RedisSessionStore").finish_non_exhaustive()
	}
}
impl SessionStore for RedisSessionStore {
	fn set<'a>(
		&'a self,
		key: &'a SessionKey,
		value: &'a TokenSecret,
		ttl: Duration,
	) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut conn = self.connection.clone();
			let _: () = redis::cmd("SET")
				.arg(key.as_str())
				.arg(value.expose())
				.arg("PX")
				.arg(ttl_millis(ttl))
				.query_async(&mut conn)
				.await
				.map_err(backend)?;

			Ok(())
		})
	}

	fn get<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, Option<TokenSecret>> {
		Box::pin(async move {
			let mut conn = self.connection.clone();
			let value: Option<String> =
				redis::cmd("GET").arg(key.as_str()).query_async(&mut conn).await.map_err(backend)?;

			Ok(value.map(TokenSecret::from))
		})
	}

	fn delete<'a>(&'a self, key: &'a SessionKey) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			let mut conn = self.connection.clone();
			let _: i64 =
				redis::cmd("DEL").arg(key.as_str()).query_async(&mut conn).await.map_err(backend)?;

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
		Box::pin(async move {
			let mut conn = self.connection.clone();
			let code: i64 = self
				.compare_and_swap
				.key(key.as_str())
				.arg(expected.expose())
				.arg(replacement.expose())
				.arg(ttl_millis(ttl))
				.invoke_async(&mut conn)
				.await
				.map_err(backend)?;

			match code {
				1 => Ok(CompareAndSwapOutcome::Updated),
				0 => Ok(CompareAndSwapOutcome::Mismatch),
				-1 => Ok(CompareAndSwapOutcome::Missing),
				other => Err(StoreError::Backend {
					message: format!("unexpected compare-and-swap reply {other}"),
				}),
			}
		})
	}
}

fn ttl_millis(ttl: Duration) -> i64 {
	ttl.whole_milliseconds().clamp(1, i64::MAX as i128) as i64
}

fn backend(e: RedisError) -> StoreError {
	StoreError::Backend { message: e.to_string() }
}
