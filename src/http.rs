//! Transport primitives for authorized API calls.
//!
//! The module exposes [`ApiTransport`], the client's only dependency on an
//! HTTP stack. A transport executes one prepared request—method, URL, optional
//! bearer secret, optional JSON body—and reports status, Retry-After hint, and
//! raw body bytes without interpreting any of them; response decoding and
//! error classification stay with the API layer. The default implementation
//! wraps [`reqwest`] behind the `reqwest` feature.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")]
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
#[cfg(feature = "reqwest")] use time::format_description::well_known::Rfc2822;
// self
#[cfg(feature = "reqwest")] use crate::error::TransportError;
use crate::{_prelude::*, auth::TokenSecret};

/// HTTP methods used by the API surfaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
	/// GET request.
	Get,
	/// POST request.
	Post,
	/// DELETE request.
	Delete,
}
impl HttpMethod {
	/// Returns the canonical method token.
	pub const fn as_str(self) -> &'static str {
		match self {
			HttpMethod::Get => "GET",
			HttpMethod::Post => "POST",
			HttpMethod::Delete => "DELETE",
		}
	}
}
impl Display for HttpMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Prepared outbound request executed by an [`ApiTransport`].
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method for the call.
	pub method: HttpMethod,
	/// Absolute request URL.
	pub url: Url,
	/// Bearer secret injected as `Authorization: Bearer <token>`, when present.
	pub bearer: Option<TokenSecret>,
	/// JSON body bytes, when the call carries one.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a bare request for the provided method and URL.
	pub fn new(method: HttpMethod, url: Url) -> Self {
		Self { method, url, bearer: None, body: None }
	}

	/// Attaches the bearer secret for the Authorization header.
	pub fn with_bearer(mut self, secret: TokenSecret) -> Self {
		self.bearer = Some(secret);

		self
	}

	/// Attaches a serialized JSON body.
	pub fn with_body(mut self, bytes: Vec<u8>) -> Self {
		self.body = Some(bytes);

		self
	}
}

/// Raw response surface the client needs: status, retry hint, body bytes.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration, if supplied.
	pub retry_after: Option<Duration>,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing authorized API calls.
///
/// Implementations must be `Send + Sync + 'static` so one transport can serve
/// every API surface without wrappers, and the returned futures must be `Send`
/// so client calls can hop executors freely.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes the prepared request, reporting transport failures as
	/// [`TransportError`](crate::error::TransportError) values.
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, ApiResponse>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, request: ApiRequest) -> TransportFuture<'_, ApiResponse> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				HttpMethod::Get => reqwest::Method::GET,
				HttpMethod::Post => reqwest::Method::POST,
				HttpMethod::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url.as_str());

			if let Some(bearer) = &request.bearer {
				builder = builder.bearer_auth(bearer.expose());
			}
			if let Some(body) = request.body {
				builder = builder.header(CONTENT_TYPE, "application/json").body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, retry_after, body })
		})
	}
}

/// Parses a Retry-After header into a relative duration (seconds or RFC 2822).
#[cfg(feature = "reqwest")]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_builders_compose() {
		let url = Url::parse("https://api.example.com/payments").expect("URL fixture should parse.");
		let request = ApiRequest::new(HttpMethod::Post, url)
			.with_bearer(TokenSecret::new("bearer"))
			.with_body(b"{}".to_vec());

		assert_eq!(request.method.as_str(), "POST");
		assert_eq!(request.bearer.as_ref().map(TokenSecret::expose), Some("bearer"));
		assert_eq!(request.body.as_deref(), Some(b"{}".as_slice()));
	}

	#[test]
	fn success_covers_the_2xx_range() {
		let response = |status| ApiResponse { status, retry_after: None, body: Vec::new() };

		assert!(response(200).is_success());
		assert!(response(204).is_success());
		assert!(!response(301).is_success());
		assert!(!response(404).is_success());
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn retry_after_parses_seconds_and_rejects_garbage() {
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, "120".parse().expect("Header fixture should parse."));

		assert_eq!(parse_retry_after(&headers), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, "soon".parse().expect("Header fixture should parse."));

		assert_eq!(parse_retry_after(&headers), None);
	}
}
