//! Single-entry developer token cache with lazy, race-free refresh.
//!
//! [`TokenCache::token`] serves the cached entry under a shared read lock while it is still
//! valid. Once the entry expires, the first caller takes the write lock, re-checks the entry
//! (another caller may have refreshed it in the meantime), and only then signs a new token. The
//! entry is published as an immutable [`Arc`] snapshot, so readers never observe a token paired
//! with another token's expiry, and a failed issuance leaves the previous entry untouched.

mod metrics;

pub use metrics::CacheMetrics;

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, IssuedToken, TokenIssuer},
	obs::{self, OperationKind, OperationSpan, Outcome},
};

/// Immutable cache entry.
#[derive(Clone, Debug)]
pub struct CachedToken {
	/// Cached compact JWT.
	pub token: BearerToken,
	/// Instant the token was minted.
	pub issued_at: OffsetDateTime,
	/// Instant the token stops being valid.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Returns `true` while `now` is earlier than the expiry minus `leeway`.
	pub fn is_fresh_at(&self, now: OffsetDateTime, leeway: Duration) -> bool {
		now < self.expires_at - leeway
	}
}
impl From<IssuedToken> for CachedToken {
	fn from(issued: IssuedToken) -> Self {
		Self { token: issued.token, issued_at: issued.issued_at, expires_at: issued.expires_at }
	}
}

/// Holds the most recently issued token and reissues it on demand after expiry.
pub struct TokenCache {
	issuer: TokenIssuer,
	refresh_leeway: Duration,
	entry: RwLock<Option<Arc<CachedToken>>>,
	metrics: CacheMetrics,
}
impl TokenCache {
	/// Creates an empty cache around `issuer`.
	pub fn new(issuer: TokenIssuer) -> Self {
		Self {
			issuer,
			refresh_leeway: Duration::ZERO,
			entry: RwLock::new(None),
			metrics: CacheMetrics::default(),
		}
	}

	/// Treats entries as expired `leeway` before their real expiry.
	///
	/// Negative values become zero; values reaching the issuer lifetime are clamped one second
	/// below it so a fresh token is always usable.
	pub fn with_refresh_leeway(mut self, leeway: Duration) -> Self {
		let ceiling = self.issuer.lifetime() - Duration::SECOND;

		self.refresh_leeway = leeway.clamp(Duration::ZERO, ceiling);

		self
	}

	/// Returns a token valid at `now`, signing a new one when the cache is empty or expired.
	pub fn token(&self, now: OffsetDateTime) -> Result<BearerToken> {
		if let Some(token) = self.fresh(self.entry.read().as_deref(), now) {
			return Ok(token);
		}

		let mut slot = self.entry.write();

		if let Some(token) = self.fresh(slot.as_deref(), now) {
			return Ok(token);
		}

		const KIND: OperationKind = OperationKind::TokenIssue;

		let _span = OperationSpan::new(KIND, "token").entered();

		obs::record_outcome(KIND, Outcome::Attempt);
		obs::token_refreshing(slot.as_ref().map(|entry| entry.expires_at));

		match self.issuer.issue(now) {
			Ok(issued) => {
				let entry = Arc::new(CachedToken::from(issued));
				let token = entry.token.clone();

				obs::token_minted(entry.expires_at);
				*slot = Some(entry);
				self.metrics.record_issued();
				obs::record_outcome(KIND, Outcome::Success);

				Ok(token)
			},
			Err(e) => {
				self.metrics.record_failure();
				obs::record_outcome(KIND, Outcome::Failure);

				Err(e.into())
			},
		}
	}

	/// Returns the current entry, if any, without refreshing it.
	pub fn snapshot(&self) -> Option<Arc<CachedToken>> {
		self.entry.read().clone()
	}

	/// Issuer used for refreshes.
	pub fn issuer(&self) -> &TokenIssuer {
		&self.issuer
	}

	/// Effective refresh leeway.
	pub fn refresh_leeway(&self) -> Duration {
		self.refresh_leeway
	}

	/// Hit/issue/failure counters.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	fn fresh(&self, entry: Option<&CachedToken>, now: OffsetDateTime) -> Option<BearerToken> {
		let entry = entry.filter(|entry| entry.is_fresh_at(now, self.refresh_leeway))?;

		self.metrics.record_hit();

		Some(entry.token.clone())
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("issuer", &self.issuer)
			.field("refresh_leeway", &self.refresh_leeway)
			.field("expires_at", &self.entry.read().as_ref().map(|entry| entry.expires_at))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{sync::Barrier, thread};
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{_preludet::*, auth::JwtClaims};

	fn cache() -> TokenCache {
		TokenCache::new(TokenIssuer::new(test_signing_key(), "TEAM123", "KEYID456"))
	}

	#[test]
	fn reuses_token_within_window() {
		let cache = cache();
		let now = macros::datetime!(2024-01-01 0:00 UTC);
		let first = cache.token(now).expect("First lookup should mint a token.");
		let second = cache.token(now + Duration::SECOND).expect("Second lookup should hit.");

		assert_eq!(first, second);
		assert_eq!(cache.metrics().issued(), 1);
		assert_eq!(cache.metrics().hits(), 1);
	}

	#[test]
	fn reissues_after_expiry() {
		let cache = cache();
		let now = macros::datetime!(2024-01-01 0:00 UTC);
		let first = cache.token(now).expect("First lookup should mint a token.");
		let later = now + Duration::hours(24);
		let second = cache.token(later).expect("Lookup at expiry should mint a new token.");
		let claims: JwtClaims = decode_segment(&second, 1);

		assert_ne!(first, second);
		assert_eq!(claims.iat, later.unix_timestamp());
		assert_eq!(claims.exp, (later + Duration::hours(24)).unix_timestamp());
		assert_eq!(cache.metrics().issued(), 2);
		assert_eq!(
			cache.snapshot().map(|entry| entry.expires_at),
			Some(later + Duration::hours(24))
		);
	}

	#[test]
	fn last_valid_instant_still_hits() {
		let cache = cache();
		let now = macros::datetime!(2024-01-01 0:00 UTC);
		let first = cache.token(now).expect("First lookup should mint a token.");
		let edge = now + Duration::hours(24) - Duration::nanoseconds(1);

		assert_eq!(cache.token(edge).expect("Lookup before expiry should hit."), first);
	}

	#[test]
	fn leeway_refreshes_early() {
		let cache = cache().with_refresh_leeway(Duration::minutes(5));
		let now = macros::datetime!(2024-01-01 0:00 UTC);
		let first = cache.token(now).expect("First lookup should mint a token.");
		let inside = now + Duration::hours(24) - Duration::minutes(10);
		let within_leeway = now + Duration::hours(24) - Duration::minutes(1);

		assert_eq!(cache.token(inside).expect("Lookup outside leeway should hit."), first);
		assert_ne!(cache.token(within_leeway).expect("Lookup inside leeway should mint."), first);
	}

	#[test]
	fn leeway_is_clamped() {
		assert_eq!(
			cache().with_refresh_leeway(Duration::seconds(-1)).refresh_leeway(),
			Duration::ZERO
		);
		assert_eq!(
			cache().with_refresh_leeway(Duration::hours(48)).refresh_leeway(),
			Duration::hours(24) - Duration::SECOND
		);
	}

	#[test]
	fn concurrent_callers_share_one_signature() {
		const CALLERS: usize = 16;

		let cache = cache();
		let barrier = Barrier::new(CALLERS);
		let now = macros::datetime!(2024-01-01 0:00 UTC);
		let tokens = thread::scope(|scope| {
			let handles = (0..CALLERS)
				.map(|_| {
					scope.spawn(|| {
						barrier.wait();

						cache.token(now).expect("Concurrent lookups should succeed.")
					})
				})
				.collect::<Vec<_>>();

			handles
				.into_iter()
				.map(|handle| handle.join().expect("Caller thread should not panic."))
				.collect::<Vec<_>>()
		});

		assert_eq!(cache.metrics().issued(), 1);
		assert_eq!(cache.metrics().hits(), (CALLERS - 1) as u64);
		assert!(tokens.iter().all(|token| *token == tokens[0]));
	}

	#[test]
	fn failed_refresh_keeps_previous_entry() {
		let cache = cache();
		let now = macros::datetime!(2024-01-01 0:00 UTC);
		let first = cache.token(now).expect("First lookup should mint a token.");
		let err = cache
			.token(time::PrimitiveDateTime::MAX.assume_utc())
			.expect_err("Issuance past the representable range should fail.");

		assert_eq!(err.kind(), crate::error::ErrorKind::SigningFailed);
		assert_eq!(cache.metrics().failures(), 1);
		assert_eq!(cache.snapshot().map(|entry| entry.token.clone()), Some(first.clone()));
		assert_eq!(cache.token(now).expect("Cached entry should still be served."), first);
	}

	#[test]
	fn snapshot_starts_empty() {
		assert!(cache().snapshot().is_none());
	}
}
