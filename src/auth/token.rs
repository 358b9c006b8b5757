//! ES256 developer token issuance.
//!
//! [`TokenIssuer`] produces compact JWTs whose signature is the raw 64-byte `r || s` pair
//! (fixed-width, big-endian) over the SHA-256 digest of `base64url(header) "." base64url(claims)`.
//! Nonces are hedged with OS randomness, so two tokens minted at the same instant carry different
//! signatures; never use a token value as a cache key.

pub mod claims;
pub mod secret;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::ecdsa::{Signature, signature::hazmat::RandomizedPrehashSigner};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{JwtClaims, JwtHeader, SigningKey, token::secret::BearerToken},
};

/// Errors raised while minting a token. Callers may retry the whole issuance.
#[derive(Debug, ThisError)]
pub enum TokenError {
	/// Header or claims could not be serialized.
	#[error("JWT segment could not be encoded.")]
	Encode(#[from] serde_json::Error),
	/// `now + lifetime` does not fit in a timestamp.
	#[error("Token expiry falls outside the representable time range.")]
	ExpiryOutOfRange,
	/// The ECDSA primitive refused to sign.
	#[error("ES256 signing failed.")]
	Signing(#[source] p256::ecdsa::Error),
}

/// Freshly minted token together with its validity window.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Compact JWT.
	pub token: BearerToken,
	/// Instant recorded as `iat`.
	pub issued_at: OffsetDateTime,
	/// Instant the token stops being valid (`issued_at + lifetime`).
	pub expires_at: OffsetDateTime,
}

/// Signs developer tokens for one key, issuer, and key identifier.
pub struct TokenIssuer {
	key: SigningKey,
	issuer: String,
	key_id: String,
	lifetime: Duration,
}
impl TokenIssuer {
	/// Validity window used unless overridden.
	pub const DEFAULT_LIFETIME: Duration = Duration::hours(24);

	/// Creates an issuer that signs with `key` on behalf of `issuer` under `key_id`.
	pub fn new(key: SigningKey, issuer: impl Into<String>, key_id: impl Into<String>) -> Self {
		Self {
			key,
			issuer: issuer.into(),
			key_id: key_id.into(),
			lifetime: Self::DEFAULT_LIFETIME,
		}
	}

	/// Overrides the validity window; values under one second are raised to one second so
	/// `exp` always lands after `iat`.
	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime = lifetime.max(Duration::SECOND);

		self
	}

	/// Issuer identifier placed in `iss`.
	pub fn issuer(&self) -> &str {
		&self.issuer
	}

	/// Key identifier placed in `kid`.
	pub fn key_id(&self) -> &str {
		&self.key_id
	}

	/// Configured validity window.
	pub fn lifetime(&self) -> Duration {
		self.lifetime
	}

	/// Mints a token valid from `now` until `now + lifetime`.
	pub fn issue(&self, now: OffsetDateTime) -> Result<IssuedToken, TokenError> {
		let expires_at = now.checked_add(self.lifetime).ok_or(TokenError::ExpiryOutOfRange)?;
		let header = JwtHeader::es256(self.key_id.as_str());
		let claims = JwtClaims::new(self.issuer.as_str(), now, expires_at);
		let token = sign_compact(&self.key, &header, &claims)?;

		Ok(IssuedToken { token, issued_at: now, expires_at })
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("issuer", &self.issuer)
			.field("key_id", &self.key_id)
			.field("lifetime", &self.lifetime)
			.finish()
	}
}

/// Encodes and signs `header.claims` with ES256.
pub fn sign_compact(
	key: &SigningKey,
	header: &JwtHeader,
	claims: &JwtClaims,
) -> Result<BearerToken, TokenError> {
	let mut compact = encode_segment(header)?;

	compact.push('.');
	compact.push_str(&encode_segment(claims)?);

	let digest = Sha256::digest(compact.as_bytes());
	let signature: Signature =
		key.ecdsa().sign_prehash_with_rng(&mut OsRng, &digest).map_err(TokenError::Signing)?;

	compact.push('.');
	compact.push_str(&URL_SAFE_NO_PAD.encode(signature.to_bytes()));

	Ok(BearerToken::new(compact))
}

fn encode_segment<T>(value: &T) -> Result<String, TokenError>
where
	T: Serialize,
{
	Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(value)?))
}
