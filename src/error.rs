//! Client-level error types shared across the token kernel, transport, and API surfaces.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Authorization is unavailable; the bearer token could not be produced.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The API endpoint answered with an error or an unreadable body.
	#[error(transparent)]
	Api(#[from] ApiError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Token acquisition failures raised by [`TokenCache`](crate::auth::TokenCache)
/// and its sources.
///
/// Surfacing these under their own umbrella keeps a failed token fetch
/// distinguishable from a generic transport error on the request that needed
/// the token.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// The token source failed; the cache keeps its prior state and the next
	/// caller retries the fetch.
	#[error("Bearer token refresh failed.")]
	Refresh {
		/// Underlying fetch failure.
		#[source]
		source: Box<Error>,
	},
	/// The fetched token carries no explicit expiry and cannot be decoded for
	/// its `exp` claim; nothing is cached.
	#[error("Bearer token cannot be decoded for expiry.")]
	MalformedToken(#[from] crate::auth::ClaimsError),
}
impl AuthError {
	/// Wraps the underlying fetch failure into a refresh error.
	pub fn refresh(source: Error) -> Self {
		Self::Refresh { source: Box::new(source) }
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// An endpoint URL could not be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The API base URL cannot have request paths joined onto it.
	#[error("API base URL cannot serve as a base.")]
	UnsupportedBase,
	/// A request path could not be joined onto the API base URL.
	#[error("Request path cannot be joined onto the API base URL.")]
	InvalidPath {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The OAuth client identifier was empty.
	#[error("Client identifier must not be empty.")]
	EmptyClientId,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}

/// Failures reported by API endpoints or while reading their responses.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Endpoint answered with a non-success status.
	#[error("API endpoint returned HTTP {status}: {message}.")]
	Endpoint {
		/// HTTP status code.
		status: u16,
		/// Machine-readable error code supplied by the API, when present.
		code: Option<String>,
		/// Human-readable summary of the failure.
		message: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Endpoint responded with malformed JSON that could not be parsed.
	#[error("API endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestSerialize {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::error::Error,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn refresh_error_keeps_the_underlying_cause() {
		let cause = Error::from(TransportError::Io(std::io::Error::other("socket closed")));
		let err = Error::from(AuthError::refresh(cause));

		assert!(matches!(err, Error::Auth(AuthError::Refresh { .. })));

		let source = StdError::source(&err)
			.expect("Refresh errors should expose the underlying fetch failure as their source.");

		assert!(source.to_string().contains("I/O error"));
	}
}
