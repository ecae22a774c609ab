//! Validated client configuration.

// self
use crate::{
	_prelude::*,
	auth::{DEFAULT_FALLBACK_TTL, DEFAULT_REFRESH_BUFFER, TokenSecret},
	error::ConfigError,
};

/// Validated, immutable configuration for one API client instance.
#[derive(Clone, Debug)]
pub struct ApiConfig {
	/// Base URL every request path is joined onto; always ends with `/`.
	pub api_base: Url,
	/// OAuth token endpoint used by the client-credentials source.
	pub token_endpoint: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Safety margin before expiry during which tokens refresh proactively.
	pub refresh_buffer: Duration,
	/// Validity window assumed for tokens without a discoverable expiry.
	pub fallback_ttl: Duration,
}
impl ApiConfig {
	/// Creates a configuration after validating both endpoints and the client
	/// identifier. Buffer and TTL start at their defaults (60 s / 1 h).
	pub fn new(
		api_base: &str,
		token_endpoint: &str,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let mut api_base =
			Url::parse(api_base).map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let token_endpoint =
			Url::parse(token_endpoint).map_err(|source| ConfigError::InvalidEndpoint { source })?;

		if api_base.cannot_be_a_base() {
			return Err(ConfigError::UnsupportedBase);
		}
		if !api_base.path().ends_with('/') {
			let path = format!("{}/", api_base.path());

			api_base.set_path(&path);
		}

		let client_id = client_id.into();

		if client_id.trim().is_empty() {
			return Err(ConfigError::EmptyClientId);
		}

		Ok(Self {
			api_base,
			token_endpoint,
			client_id,
			client_secret: TokenSecret::new(client_secret),
			refresh_buffer: DEFAULT_REFRESH_BUFFER,
			fallback_ttl: DEFAULT_FALLBACK_TTL,
		})
	}

	/// Overrides the refresh buffer; negative values clamp to zero.
	pub fn with_refresh_buffer(mut self, buffer: Duration) -> Self {
		self.refresh_buffer = if buffer.is_negative() { Duration::ZERO } else { buffer };

		self
	}

	/// Overrides the fallback TTL; negative values clamp to zero.
	pub fn with_fallback_ttl(mut self, ttl: Duration) -> Self {
		self.fallback_ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Joins a relative request path onto the API base.
	pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.api_base.join(path).map_err(|source| ConfigError::InvalidPath { source })
	}
}
