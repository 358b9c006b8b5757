//! Redacted bearer token wrapper.

// crates.io
use http::HeaderValue;
// self
use crate::{_prelude::*, error::ConfigError};

/// Compact ES256 JWT (`header.claims.signature`) that keeps itself out of logs.
///
/// Cloning is cheap; every clone shares the same immutable string.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Arc<str>);
impl BearerToken {
	/// Wraps an already encoded compact token.
	pub fn new(value: impl Into<Arc<str>>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Builds the sensitive `Bearer <token>` value for an `Authorization` header.
	pub fn header_value(&self) -> Result<HeaderValue, ConfigError> {
		let mut value = HeaderValue::try_from(format!("Bearer {}", self.expose()))?;

		value.set_sensitive(true);

		Ok(value)
	}
}
impl AsRef<str> for BearerToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("BearerToken").field(&"<redacted>").finish()
	}
}
impl Display for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_formatters_redact() {
		let token = BearerToken::new("aaa.bbb.ccc");

		assert_eq!(format!("{token:?}"), "BearerToken(\"<redacted>\")");
		assert_eq!(format!("{token}"), "<redacted>");
	}

	#[test]
	fn header_value_is_sensitive() {
		let value = BearerToken::new("aaa.bbb.ccc")
			.header_value()
			.expect("Compact tokens should always form a valid header value.");

		assert_eq!(value, "Bearer aaa.bbb.ccc");
		assert!(value.is_sensitive());
	}

	#[test]
	fn header_value_rejects_control_characters() {
		assert!(BearerToken::new("aaa\nbbb").header_value().is_err());
	}
}
