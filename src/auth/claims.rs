//! Expiry-claim extraction for bearer tokens issued as compact JWTs.
//!
//! The payment API hands out signed tokens whose payload carries the standard
//! `exp` claim (epoch seconds). The cache only needs that one claim, so the
//! token is split into its compact segments and the payload decoded without
//! signature verification—the API remains the authority on token validity.

// crates.io
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Error returned when a bearer token cannot be decoded for its expiry claim.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// The token is not a three-segment compact JWT.
	#[error("Token is not a compact JWT ({segments} segments).")]
	NotCompactJwt {
		/// Number of dot-separated segments observed.
		segments: usize,
	},
	/// The payload segment is not valid URL-safe base64.
	#[error("Token payload is not valid URL-safe base64.")]
	PayloadEncoding(#[from] base64::DecodeError),
	/// The payload segment is not a JSON object.
	#[error("Token payload is not valid JSON.")]
	PayloadJson(#[from] serde_json::error::Error),
	/// The `exp` claim does not denote a representable instant.
	#[error("The exp claim ({exp}) is outside the representable range.")]
	ExpiryOutOfRange {
		/// Raw epoch-seconds value carried by the claim.
		exp: i64,
	},
}

#[derive(Deserialize)]
struct Claims {
	exp: Option<i64>,
}

/// Decodes the `exp` claim of a compact JWT into an absolute instant.
///
/// Returns `Ok(None)` when the token decodes cleanly but carries no `exp`
/// claim; the caller falls back to a fixed TTL in that case.
pub fn decode_expiry(token: &str) -> Result<Option<OffsetDateTime>, ClaimsError> {
	let segments = token.split('.').collect::<Vec<_>>();

	if segments.len() != 3 {
		return Err(ClaimsError::NotCompactJwt { segments: segments.len() });
	}

	let payload = URL_SAFE_NO_PAD.decode(segments[1])?;
	let claims = serde_json::from_slice::<Claims>(&payload)?;

	claims
		.exp
		.map(|exp| {
			OffsetDateTime::from_unix_timestamp(exp).map_err(|_| ClaimsError::ExpiryOutOfRange { exp })
		})
		.transpose()
}
