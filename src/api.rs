//! Typed API surfaces over the authorized transport.
//!
//! Every surface is a thin pass-through: it serializes a request payload,
//! borrows a bearer token from the cache, executes the call via the transport
//! seam, and decodes the response. All token lifecycle concerns live in
//! [`auth`](crate::auth); nothing here retries or inspects tokens.

pub mod consents;
pub mod id;
pub mod institutions;
pub mod payments;
pub mod refunds;

pub use consents::*;
pub use id::*;
pub use institutions::*;
pub use payments::*;
pub use refunds::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{TokenCache, TokenSource},
	config::ApiConfig,
	error::ApiError,
	http::{ApiRequest, ApiResponse, ApiTransport, HttpMethod},
	obs::{self, CallKind, CallOutcome, CallSpan},
};
#[cfg(feature = "reqwest")]
use crate::{auth::ClientCredentialsSource, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Root handle coordinating authorized calls against one payment API tenant.
///
/// The client owns the transport, the validated configuration, and the token
/// cache so the endpoint surfaces can focus on their payloads. Each client
/// instance carries its own cache; independent clients never share token
/// state.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	/// Token cache injected into every request as the bearer credential.
	pub token_cache: Arc<TokenCache>,
	/// Validated configuration for this tenant.
	pub config: ApiConfig,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport + token source pair.
	pub fn with_transport(
		config: ApiConfig,
		transport: impl Into<Arc<T>>,
		source: Arc<dyn TokenSource>,
	) -> Self {
		let token_cache = Arc::new(
			TokenCache::new(source)
				.with_refresh_buffer(config.refresh_buffer)
				.with_fallback_ttl(config.fallback_ttl),
		);

		Self { transport: transport.into(), token_cache, config }
	}

	/// Consent operations.
	pub fn consents(&self) -> ConsentsApi<'_, T> {
		ConsentsApi(self)
	}

	/// Payment operations.
	pub fn payments(&self) -> PaymentsApi<'_, T> {
		PaymentsApi(self)
	}

	/// Refund operations.
	pub fn refunds(&self) -> RefundsApi<'_, T> {
		RefundsApi(self)
	}

	/// Institution metadata operations.
	pub fn institutions(&self) -> InstitutionsApi<'_, T> {
		InstitutionsApi(self)
	}

	pub(crate) async fn request_json<Res>(
		&self,
		kind: CallKind,
		stage: &'static str,
		method: HttpMethod,
		path: &str,
		body: Option<Vec<u8>>,
	) -> Result<Res>
	where
		Res: DeserializeOwned,
	{
		let response = self.call(kind, stage, method, path, body).await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			ApiError::ResponseParse { source, status: Some(response.status) }.into()
		})
	}

	pub(crate) async fn request_empty(
		&self,
		kind: CallKind,
		stage: &'static str,
		method: HttpMethod,
		path: &str,
	) -> Result<()> {
		self.call(kind, stage, method, path, None).await.map(|_| ())
	}

	async fn call(
		&self,
		kind: CallKind,
		stage: &'static str,
		method: HttpMethod,
		path: &str,
		body: Option<Vec<u8>>,
	) -> Result<ApiResponse> {
		let span = CallSpan::new(kind, stage);

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let url = self.config.endpoint(path)?;
				let bearer = self.token_cache.access_token().await?;
				let mut request = ApiRequest::new(method, url).with_bearer(bearer);

				if let Some(body) = body {
					request = request.with_body(body);
				}

				let response = self.transport.execute(request).await?;

				if response.is_success() {
					return Ok(response);
				}

				Err(endpoint_error(&response).into())
			})
			.await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client that provisions its own reqwest transport and
	/// client-credentials token source from the configuration.
	pub fn new(config: ApiConfig) -> Self {
		let http = ReqwestClient::default();
		let source: Arc<dyn TokenSource> = Arc::new(ClientCredentialsSource::new(
			http.clone(),
			config.token_endpoint.clone(),
			config.client_id.clone(),
			config.client_secret.expose(),
		));

		Self::with_transport(config, ReqwestTransport::with_client(http), source)
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			token_cache: self.token_cache.clone(),
			config: self.config.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("api_base", &self.config.api_base.as_str())
			.field("client_id", &self.config.client_id)
			.finish()
	}
}

/// Envelope wrapping list responses from the API.
#[derive(Deserialize)]
pub(crate) struct ApiPage<T> {
	pub data: Vec<T>,
}

fn endpoint_error(response: &ApiResponse) -> ApiError {
	#[derive(Default, Deserialize)]
	struct ErrorBody {
		#[serde(default)]
		code: Option<String>,
		#[serde(default)]
		message: Option<String>,
	}

	let parsed = serde_json::from_slice::<ErrorBody>(&response.body).unwrap_or_default();

	ApiError::Endpoint {
		status: response.status,
		code: parsed.code,
		message: parsed.message.unwrap_or_else(|| "API endpoint rejected the request".into()),
		retry_after: response.retry_after,
	}
}

pub(crate) fn encode_body<B>(body: &B) -> Result<Vec<u8>>
where
	B: Serialize,
{
	serde_json::to_vec(body).map_err(|source| ApiError::RequestSerialize { source }.into())
}
