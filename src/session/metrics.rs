// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::_prelude::*;

/// In-process reissue counters.
///
/// Rejections are reissues refused for a bad or stale pair; replays are the subset whose
/// refresh token verified but no longer matched the stored one, which is what a stolen and
/// already rotated token looks like. Errors are storage or signing failures.
#[derive(Debug, Default)]
pub struct ReissueMetrics {
	attempts: AtomicU64,
	rotated: AtomicU64,
	rejected: AtomicU64,
	replayed: AtomicU64,
	errored: AtomicU64,
}
impl ReissueMetrics {
	/// Total reissue calls.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Reissues that rotated the pair.
	pub fn successes(&self) -> u64 {
		self.rotated.load(Ordering::Relaxed)
	}

	/// Reissues refused for an invalid, mismatched, or stale pair.
	pub fn rejections(&self) -> u64 {
		self.rejected.load(Ordering::Relaxed)
	}

	/// Rejections caused by a refresh token that was already rotated or revoked.
	pub fn replays(&self) -> u64 {
		self.replayed.load(Ordering::Relaxed)
	}

	/// Reissues that failed on storage or signing.
	pub fn errors(&self) -> u64 {
		self.errored.load(Ordering::Relaxed)
	}

	/// Every reissue that did not rotate.
	pub fn failures(&self) -> u64 {
		self.rejections() + self.errors()
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_replay(&self) {
		self.replayed.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_result<T>(&self, result: &Result<T>) {
		let counter = match result {
			Ok(_) => &self.rotated,
			Err(Error::InvalidAccessToken | Error::InvalidRefreshToken) => &self.rejected,
			Err(_) => &self.errored,
		};

		counter.fetch_add(1, Ordering::Relaxed);
	}
}
