//! Access-token cache and refresh coordinator.
//!
//! One optional `Arc<CachedToken>` slot serves every caller. The fast path
//! clones the slot under a read lock and never touches the refresh guard; the
//! slow path acquires the async guard, re-checks the slot (another task may
//! have finished a refresh while this one waited), and only then calls the
//! source. Publication replaces the whole `Arc`, so readers observe either the
//! old token or the new one, never a partial update.
//!
//! A failed fetch propagates only to the caller that performed it and leaves
//! the slot untouched. Waiters queued on the guard re-run the check, find the
//! slot still stale or empty, and retry with their own fetch, so the cache
//! never wedges and never needs a retry loop of its own.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{FetchedToken, TokenSecret, TokenSource, claims},
	error::AuthError,
	obs::{self, CallKind, CallOutcome, CallSpan},
};

/// Safety margin before actual expiry during which a token is proactively
/// treated as stale, avoiding use of a token that expires mid-request.
pub const DEFAULT_REFRESH_BUFFER: Duration = Duration::seconds(60);
/// Assumed validity window for tokens that expose no discoverable expiry.
pub const DEFAULT_FALLBACK_TTL: Duration = Duration::hours(1);

/// Immutable snapshot of a fetched bearer token.
#[derive(Clone, Debug)]
pub struct CachedToken {
	value: TokenSecret,
	fetched_at: OffsetDateTime,
	expires_at: Option<OffsetDateTime>,
}
impl CachedToken {
	fn new(value: TokenSecret, fetched_at: OffsetDateTime, expires_at: Option<OffsetDateTime>) -> Self {
		Self { value, fetched_at, expires_at }
	}

	/// Returns the bearer token value; callers must avoid logging it.
	pub fn value(&self) -> &TokenSecret {
		&self.value
	}

	/// Instant the token was obtained from the source.
	pub fn fetched_at(&self) -> OffsetDateTime {
		self.fetched_at
	}

	/// Structural or claim-derived expiry, when one was discoverable.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_at
	}

	/// Expiry instant used for freshness checks. Tokens without a discoverable
	/// expiry count as valid for `fallback_ttl` from the fetch instant.
	pub fn effective_expiry(&self, fallback_ttl: Duration) -> OffsetDateTime {
		self.expires_at.unwrap_or(self.fetched_at + fallback_ttl)
	}

	/// A token is usable only while `now + buffer` stays short of its expiry.
	pub fn is_usable_at(&self, now: OffsetDateTime, buffer: Duration, fallback_ttl: Duration) -> bool {
		now + buffer < self.effective_expiry(fallback_ttl)
	}
}

/// Produces a currently valid bearer token on demand, performing at most one
/// concurrent refresh per instance regardless of caller count.
///
/// The cache is an owned, injectable component—build one per client instance
/// rather than sharing a process-wide singleton, so independent clients (and
/// tests) never share token state.
pub struct TokenCache {
	/// Shared counters describing refresh activity on this cache.
	pub refresh_metrics: Arc<RefreshMetrics>,
	source: Arc<dyn TokenSource>,
	slot: RwLock<Option<Arc<CachedToken>>>,
	refresh_guard: AsyncMutex<()>,
	refresh_buffer: Duration,
	fallback_ttl: Duration,
}
impl TokenCache {
	/// Creates a cache over the provided source with the default refresh
	/// buffer (60 seconds) and fallback TTL (1 hour).
	pub fn new(source: Arc<dyn TokenSource>) -> Self {
		Self {
			refresh_metrics: Default::default(),
			source,
			slot: RwLock::new(None),
			refresh_guard: AsyncMutex::new(()),
			refresh_buffer: DEFAULT_REFRESH_BUFFER,
			fallback_ttl: DEFAULT_FALLBACK_TTL,
		}
	}

	/// Overrides the refresh buffer; negative values clamp to zero.
	pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Overrides the fallback TTL applied to tokens without a discoverable expiry.
	pub fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
		self.fallback_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Returns the current bearer token, refreshing it first when the slot is
	/// empty or the cached token is within the refresh buffer of its expiry.
	///
	/// Callers that arrive during a refresh park on the guard and pick up the
	/// freshly published token through the re-check, so N concurrent calls
	/// against a cold cache cost exactly one source fetch.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.usable_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let _refresh = self.refresh_guard.lock().await;

		if let Some(token) = self.usable_token(OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		self.fetch_and_publish().await
	}

	/// Forces a fetch-and-replace regardless of the cached token's validity,
	/// under the same guard discipline as the slow path.
	pub async fn refresh(&self) -> Result<TokenSecret> {
		let _refresh = self.refresh_guard.lock().await;

		self.fetch_and_publish().await
	}

	/// Drops the cached token; the next access always refetches.
	pub async fn clear(&self) {
		let _refresh = self.refresh_guard.lock().await;

		*self.slot.write() = None;
	}

	/// Returns the cached token snapshot without any freshness evaluation.
	pub fn snapshot(&self) -> Option<Arc<CachedToken>> {
		self.slot.read().clone()
	}

	fn usable_token(&self, now: OffsetDateTime) -> Option<TokenSecret> {
		self.slot
			.read()
			.as_ref()
			.filter(|token| token.is_usable_at(now, self.refresh_buffer, self.fallback_ttl))
			.map(|token| token.value().clone())
	}

	// Caller must hold the refresh guard.
	async fn fetch_and_publish(&self) -> Result<TokenSecret> {
		const KIND: CallKind = CallKind::TokenRefresh;

		let span = CallSpan::new(KIND, "fetch_and_publish");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let fetched =
					self.source.fetch().await.map_err(|err| Error::from(AuthError::refresh(err)))?;
				let fetched_at = OffsetDateTime::now_utc();
				let expires_at = self.resolve_expiry(&fetched)?;
				let token = Arc::new(CachedToken::new(fetched.token, fetched_at, expires_at));

				*self.slot.write() = Some(token.clone());

				Ok(token.value().clone())
			})
			.await;

		match &result {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);
			},
		}

		result
	}

	fn resolve_expiry(&self, fetched: &FetchedToken) -> Result<Option<OffsetDateTime>> {
		if let Some(instant) = fetched.expires_at {
			return Ok(Some(instant));
		}

		claims::decode_expiry(fetched.token.expose())
			.map_err(|err| AuthError::MalformedToken(err).into())
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("cached", &self.slot.read().is_some())
			.field("refresh_buffer", &self.refresh_buffer)
			.field("fallback_ttl", &self.fallback_ttl)
			.finish()
	}
}
