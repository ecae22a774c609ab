//! Bearer-token material, wrapped so it cannot leak through logs.

// self
use crate::_prelude::*;

/// Opaque holder for a bearer token or client secret.
///
/// Both formatters print `<redacted>`; only [`expose`](Self::expose) reveals
/// the credential, which keeps accidental `{:?}` dumps of requests, configs,
/// and cache snapshots safe to ship to log aggregators.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps raw credential material.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Reveals the credential for header building. Never log the result.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatters_redact_but_expose_does_not() {
		let secret = TokenSecret::new("bearer-material");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(secret.expose(), "bearer-material");
	}
}
