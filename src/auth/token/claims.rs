//! JOSE header and registered claims carried by developer tokens.

// self
use crate::_prelude::*;

/// Signature algorithm advertised in every header.
pub const ES256: &str = "ES256";
/// Token type advertised in every header.
pub const JWT: &str = "JWT";

/// JOSE header; fields serialize in `alg`, `typ`, `kid` order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtHeader {
	/// Signature algorithm, always [`ES256`].
	pub alg: String,
	/// Token type, always [`JWT`].
	pub typ: String,
	/// Identifier of the public key the verifier should use.
	pub kid: String,
}
impl JwtHeader {
	/// Builds an ES256 header for the provided key identifier.
	pub fn es256(kid: impl Into<String>) -> Self {
		Self { alg: ES256.into(), typ: JWT.into(), kid: kid.into() }
	}
}

/// Registered claims; fields serialize in `iss`, `iat`, `exp` order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
	/// Issuer identifier (the developer team).
	pub iss: String,
	/// Issued-at, seconds since the Unix epoch.
	pub iat: i64,
	/// Expiry, seconds since the Unix epoch.
	pub exp: i64,
}
impl JwtClaims {
	/// Claims for a token valid from `issued_at` until `expires_at`.
	pub fn new(
		iss: impl Into<String>,
		issued_at: OffsetDateTime,
		expires_at: OffsetDateTime,
	) -> Self {
		Self { iss: iss.into(), iat: issued_at.unix_timestamp(), exp: expires_at.unix_timestamp() }
	}
}
