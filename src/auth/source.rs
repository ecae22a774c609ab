//! Token source contract and the default client-credentials implementation.
//!
//! A [`TokenSource`] performs the actual credential exchange over the network.
//! The cache never cares how the token is minted; anything that can produce a
//! bearer string (and, optionally, an absolute expiry) can back it.

// self
#[cfg(feature = "reqwest")] use crate::error::{ApiError, ConfigError, TransportError};
#[cfg(feature = "reqwest")] use crate::http::parse_retry_after;
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`TokenSource::fetch`].
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Credential exchange contract consumed by the token cache.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Exchanges client credentials for a fresh bearer token.
	fn fetch(&self) -> SourceFuture<'_, FetchedToken>;
}

/// Outcome of a successful [`TokenSource::fetch`] call.
#[derive(Clone, Debug)]
pub struct FetchedToken {
	/// Raw bearer token; callers must avoid logging it.
	pub token: TokenSecret,
	/// Absolute expiry when the source supplies one structurally.
	pub expires_at: Option<OffsetDateTime>,
}
impl FetchedToken {
	/// Creates a fetched token with an optional structural expiry.
	pub fn new(token: impl Into<String>, expires_at: Option<OffsetDateTime>) -> Self {
		Self { token: TokenSecret::new(token), expires_at }
	}
}

/// Converts a relative `expires_in` (seconds) into an absolute expiry instant.
#[cfg(feature = "reqwest")]
fn expiry_from_expires_in(now: OffsetDateTime, secs: i64) -> Result<OffsetDateTime> {
	if secs <= 0 {
		return Err(ConfigError::NonPositiveExpiresIn.into());
	}

	now.checked_add(Duration::seconds(secs)).ok_or_else(|| ConfigError::ExpiresInOutOfRange.into())
}

#[cfg(feature = "reqwest")]
#[derive(Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	#[serde(default)]
	expires_in: Option<i64>,
}

#[cfg(feature = "reqwest")]
#[derive(Deserialize, Default)]
struct TokenEndpointErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	error_description: Option<String>,
}

/// Reqwest-backed [`TokenSource`] performing the `client_credentials` grant
/// with HTTP Basic client authentication.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ClientCredentialsSource {
	http: ReqwestClient,
	token_endpoint: Url,
	client_id: String,
	client_secret: TokenSecret,
}
#[cfg(feature = "reqwest")]
impl ClientCredentialsSource {
	/// Creates a source for the provided token endpoint and client credentials.
	pub fn new(
		http: ReqwestClient,
		token_endpoint: Url,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			http,
			token_endpoint,
			client_id: client_id.into(),
			client_secret: TokenSecret::new(client_secret),
		}
	}

	async fn exchange(&self) -> Result<FetchedToken> {
		let response = self
			.http
			.post(self.token_endpoint.clone())
			.basic_auth(&self.client_id, Some(self.client_secret.expose()))
			.form(&[("grant_type", "client_credentials")])
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let retry_after = parse_retry_after(response.headers());
		let body = response.bytes().await.map_err(TransportError::from)?;

		if !(200..300).contains(&status) {
			let parsed =
				serde_json::from_slice::<TokenEndpointErrorBody>(&body).unwrap_or_default();
			let message = parsed
				.error_description
				.or_else(|| parsed.error.clone())
				.unwrap_or_else(|| "token endpoint rejected the request".into());

			return Err(ApiError::Endpoint { status, code: parsed.error, message, retry_after }
				.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&body);
		let parsed: TokenEndpointResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ApiError::ResponseParse { source, status: Some(status) })?;
		let expires_at = parsed
			.expires_in
			.map(|secs| expiry_from_expires_in(OffsetDateTime::now_utc(), secs))
			.transpose()?;

		Ok(FetchedToken::new(parsed.access_token, expires_at))
	}
}
#[cfg(feature = "reqwest")]
impl TokenSource for ClientCredentialsSource {
	fn fetch(&self) -> SourceFuture<'_, FetchedToken> {
		Box::pin(self.exchange())
	}
}
#[cfg(feature = "reqwest")]
impl Debug for ClientCredentialsSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentialsSource")
			.field("token_endpoint", &self.token_endpoint.as_str())
			.field("client_id", &self.client_id)
			.finish()
	}
}
