// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};
// crates.io
use time::{Duration, OffsetDateTime};
// self
use openbanking_client::{
	auth::{FetchedToken, SourceFuture, TokenCache, TokenSource},
	error::{AuthError, Error, TransportError},
};

// Compact JWT with payload `{"sub":"payments"}` and no `exp` claim.
const JWT_WITHOUT_EXP: &str = "eyJhbGciOiJub25lIn0.eyJzdWIiOiJwYXltZW50cyJ9.c2ln";
// Compact JWT with payload `{"exp":946684800}` (2000-01-01T00:00:00Z).
const JWT_EXPIRED: &str = "eyJhbGciOiJub25lIn0.eyJleHAiOjk0NjY4NDgwMH0.c2ln";

/// Source that counts fetches and mints sequentially numbered tokens with a
/// fixed time to live.
struct CountingSource {
	calls: AtomicUsize,
	ttl: Duration,
	fail_next: AtomicBool,
}
impl CountingSource {
	fn with_ttl(ttl: Duration) -> Self {
		Self { calls: AtomicUsize::new(0), ttl, fail_next: AtomicBool::new(false) }
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn fail_next(&self) {
		self.fail_next.store(true, Ordering::SeqCst);
	}
}
impl TokenSource for CountingSource {
	fn fetch(&self) -> SourceFuture<'_, FetchedToken> {
		Box::pin(async move {
			let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

			if self.fail_next.swap(false, Ordering::SeqCst) {
				return Err(Error::from(TransportError::Io(std::io::Error::other(
					"connection reset",
				))));
			}

			Ok(FetchedToken::new(
				format!("token-{call}"),
				Some(OffsetDateTime::now_utc() + self.ttl),
			))
		})
	}
}

/// Source whose first fetch stalls long enough for other callers to queue on
/// the refresh guard, then fails; later fetches succeed immediately.
struct StallingFirstFetchSource {
	calls: AtomicUsize,
	ttl: Duration,
}
impl StallingFirstFetchSource {
	fn with_ttl(ttl: Duration) -> Self {
		Self { calls: AtomicUsize::new(0), ttl }
	}
}
impl TokenSource for StallingFirstFetchSource {
	fn fetch(&self) -> SourceFuture<'_, FetchedToken> {
		Box::pin(async move {
			let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

			if call == 1 {
				tokio::time::sleep(std::time::Duration::from_millis(50)).await;

				return Err(Error::from(TransportError::Io(std::io::Error::other(
					"connection reset",
				))));
			}

			Ok(FetchedToken::new(
				format!("token-{call}"),
				Some(OffsetDateTime::now_utc() + self.ttl),
			))
		})
	}
}

/// Source that always serves the same fixed token string with no structural
/// expiry, forcing the cache to resolve expiry from the token itself.
struct FixedSource(&'static str, AtomicUsize);
impl FixedSource {
	fn new(token: &'static str) -> Self {
		Self(token, AtomicUsize::new(0))
	}
}
impl TokenSource for FixedSource {
	fn fetch(&self) -> SourceFuture<'_, FetchedToken> {
		Box::pin(async move {
			self.1.fetch_add(1, Ordering::SeqCst);

			Ok(FetchedToken::new(self.0, None))
		})
	}
}

fn cache_over(source: Arc<CountingSource>) -> TokenCache {
	TokenCache::new(source)
}

#[tokio::test]
async fn concurrent_cold_calls_fetch_exactly_once() {
	let source = Arc::new(CountingSource::with_ttl(Duration::hours(1)));
	let cache = cache_over(source.clone());
	let (a, b, c, d) = tokio::join!(
		cache.access_token(),
		cache.access_token(),
		cache.access_token(),
		cache.access_token(),
	);

	for token in [a, b, c, d] {
		assert_eq!(token.expect("Concurrent access should succeed.").expose(), "token-1");
	}

	assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn valid_tokens_are_reused_without_refetching() {
	let source = Arc::new(CountingSource::with_ttl(Duration::hours(1)));
	let cache = cache_over(source.clone());

	for _ in 0..3 {
		let token = cache.access_token().await.expect("Cached access should succeed.");

		assert_eq!(token.expose(), "token-1");
	}

	assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn tokens_inside_the_refresh_buffer_are_replaced() {
	// 30 s of validity sits inside the 60 s buffer, so every later access
	// treats the cached token as stale.
	let source = Arc::new(CountingSource::with_ttl(Duration::seconds(30)));
	let cache = cache_over(source.clone());
	let first = cache.access_token().await.expect("First access should succeed.");
	let second = cache.access_token().await.expect("Second access should succeed.");

	assert_eq!(first.expose(), "token-1");
	assert_eq!(second.expose(), "token-2");
	assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn tokens_outside_the_refresh_buffer_are_kept() {
	let source = Arc::new(CountingSource::with_ttl(Duration::seconds(90)));
	let cache = cache_over(source.clone());
	let first = cache.access_token().await.expect("First access should succeed.");
	let second = cache.access_token().await.expect("Second access should succeed.");

	assert_eq!(first.expose(), "token-1");
	assert_eq!(second.expose(), "token-1");
	assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn expired_tokens_are_refetched_before_returning() {
	let source = Arc::new(CountingSource::with_ttl(Duration::seconds(-5)));
	let cache = cache_over(source.clone());
	let first = cache.access_token().await.expect("First access should succeed.");
	let second = cache.access_token().await.expect("Second access should succeed.");

	assert_eq!(first.expose(), "token-1");
	assert_eq!(second.expose(), "token-2");
	assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn clear_forces_the_next_access_to_refetch() {
	let source = Arc::new(CountingSource::with_ttl(Duration::hours(1)));
	let cache = cache_over(source.clone());

	cache.access_token().await.expect("Initial access should succeed.");
	cache.clear().await;

	assert!(cache.snapshot().is_none());

	let token = cache.access_token().await.expect("Access after clear should succeed.");

	assert_eq!(token.expose(), "token-2");
	assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn refresh_replaces_a_still_valid_token() {
	let source = Arc::new(CountingSource::with_ttl(Duration::hours(1)));
	let cache = cache_over(source.clone());
	let first = cache.access_token().await.expect("Initial access should succeed.");
	let forced = cache.refresh().await.expect("Forced refresh should succeed.");

	assert_eq!(first.expose(), "token-1");
	assert_eq!(forced.expose(), "token-2");
	assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn failed_fetch_surfaces_and_the_next_caller_retries() {
	let source = Arc::new(CountingSource::with_ttl(Duration::hours(1)));
	let cache = cache_over(source.clone());

	source.fail_next();

	let err = cache.access_token().await.expect_err("Cold fetch failure should surface.");

	assert!(matches!(err, Error::Auth(AuthError::Refresh { .. })));
	assert!(cache.snapshot().is_none());

	// The guard is released on failure; the retry runs its own fetch.
	let token = cache.access_token().await.expect("Retry after failure should succeed.");

	assert_eq!(token.expose(), "token-2");
	assert_eq!(source.calls(), 2);
	assert_eq!(cache.refresh_metrics.attempts(), 2);
	assert_eq!(cache.refresh_metrics.failures(), 1);
	assert_eq!(cache.refresh_metrics.successes(), 1);
}

#[tokio::test]
async fn queued_waiters_retry_independently_when_the_holder_fails() {
	let source = Arc::new(StallingFirstFetchSource::with_ttl(Duration::hours(1)));
	let cache = TokenCache::new(source.clone());
	// All three miss the empty slot; one holds the guard through the doomed
	// fetch while the other two queue behind it.
	let outcomes = {
		let (a, b, c) =
			tokio::join!(cache.access_token(), cache.access_token(), cache.access_token());

		[a, b, c]
	};
	let failures = outcomes
		.iter()
		.filter(|outcome| {
			matches!(outcome, Err(Error::Auth(AuthError::Refresh { .. })))
		})
		.count();

	// The fetch failure reaches only the caller that performed it.
	assert_eq!(failures, 1);

	// The first waiter re-runs the check, finds the slot still empty, and
	// fetches for itself; the second picks up that published token.
	for token in outcomes.into_iter().flatten() {
		assert_eq!(token.expose(), "token-2");
	}

	assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_refresh_keeps_the_previous_token() {
	let source = Arc::new(CountingSource::with_ttl(Duration::hours(1)));
	let cache = cache_over(source.clone());

	cache.access_token().await.expect("Initial access should succeed.");
	source.fail_next();
	cache.refresh().await.expect_err("Forced refresh should fail.");

	// The slot still holds the previous token, which remains valid.
	let token = cache.access_token().await.expect("Access after failed refresh should succeed.");

	assert_eq!(token.expose(), "token-1");
	assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn decodable_tokens_without_exp_use_the_fallback_ttl() {
	let source = Arc::new(FixedSource::new(JWT_WITHOUT_EXP));
	let cache = TokenCache::new(source.clone());
	let token = cache.access_token().await.expect("JWT without exp should be accepted.");

	assert_eq!(token.expose(), JWT_WITHOUT_EXP);

	let cached = cache.snapshot().expect("Token should be cached.");

	assert!(cached.expires_at().is_none());
	assert_eq!(
		cached.effective_expiry(Duration::hours(1)),
		cached.fetched_at() + Duration::hours(1),
	);

	// Within the fallback window the token is reused.
	cache.access_token().await.expect("Cached access should succeed.");

	assert_eq!(source.1.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_exp_claims_drive_refetching() {
	let source = Arc::new(FixedSource::new(JWT_EXPIRED));
	let cache = TokenCache::new(source.clone());

	cache.access_token().await.expect("First access should succeed.");
	cache.access_token().await.expect("Second access should succeed.");

	// The decoded exp lies in the past, so each access fetches again.
	assert_eq!(source.1.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn undecodable_tokens_error_and_cache_nothing() {
	let source = Arc::new(FixedSource::new("opaque-not-a-jwt"));
	let cache = TokenCache::new(source.clone());
	let err = cache.access_token().await.expect_err("Opaque tokens should be rejected.");

	assert!(matches!(err, Error::Auth(AuthError::MalformedToken(_))));
	assert!(cache.snapshot().is_none());

	// The cache stays serviceable; the next call runs a fresh fetch.
	cache.access_token().await.expect_err("The source still serves an opaque token.");

	assert_eq!(source.1.load(Ordering::SeqCst), 2);
}
