//! Transport decorator that injects the cached developer token into every request.

// crates.io
use http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	cache::TokenCache,
	error::TransportError,
	http::{HttpRequest, HttpTransport, TransportFuture},
	obs::{self, OperationKind, OperationSpan, Outcome},
};

/// Source of "now" used for token freshness checks.
pub type Clock = fn() -> OffsetDateTime;

/// Wraps an [`HttpTransport`] and authenticates each request with `Authorization: Bearer`.
///
/// The header replaces any existing `Authorization` value and is marked sensitive. If no valid
/// token can be produced the request fails with the issuance error and the wrapped transport is
/// never called. Errors from the wrapped transport are returned as
/// [`TransportError::Network`] with the original error as their source.
pub struct AuthenticatingTransport<T>
where
	T: HttpTransport,
{
	inner: T,
	cache: Arc<TokenCache>,
	clock: Clock,
}
impl<T> AuthenticatingTransport<T>
where
	T: HttpTransport,
{
	/// Decorates `inner` with tokens drawn from `cache`.
	pub fn new(inner: T, cache: Arc<TokenCache>) -> Self {
		Self { inner, cache, clock: OffsetDateTime::now_utc }
	}

	/// Replaces the wall clock used to evaluate token freshness.
	pub fn with_clock(mut self, clock: Clock) -> Self {
		self.clock = clock;

		self
	}

	/// Shared token cache.
	pub fn cache(&self) -> &Arc<TokenCache> {
		&self.cache
	}

	/// Wrapped transport.
	pub fn inner(&self) -> &T {
		&self.inner
	}

	fn authorize(&self, request: &mut HttpRequest) -> Result<()> {
		let token = self.cache.token((self.clock)())?;
		let value = token.header_value()?;

		request.headers_mut().insert(AUTHORIZATION, value);

		Ok(())
	}
}
impl<T> HttpTransport for AuthenticatingTransport<T>
where
	T: HttpTransport,
{
	type Error = Error;

	fn send(&self, mut request: HttpRequest) -> TransportFuture<'_, Self::Error> {
		const KIND: OperationKind = OperationKind::AuthenticatedRequest;

		let span = OperationSpan::new(KIND, "send");

		obs::record_outcome(KIND, Outcome::Attempt);

		Box::pin(span.instrument(async move {
			let result = match self.authorize(&mut request) {
				Ok(()) => self
					.inner
					.send(request)
					.await
					.map_err(|e| Error::from(TransportError::network(e))),
				Err(e) => Err(e),
			};

			match &result {
				Ok(_) => obs::record_outcome(KIND, Outcome::Success),
				Err(_) => obs::record_outcome(KIND, Outcome::Failure),
			}

			result
		}))
	}
}
impl<T> Debug for AuthenticatingTransport<T>
where
	T: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatingTransport").field("cache", &self.cache).finish()
	}
}
