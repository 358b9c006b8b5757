//! PEM/PKCS#8 private key loading for ES256 signing.

// std
use std::{fs, path::Path};
// crates.io
use p256::{
	ecdsa::{SigningKey as EcdsaSigningKey, VerifyingKey},
	pkcs8::{ObjectIdentifier, PrivateKeyInfo, der::pem},
};
// self
use crate::{_prelude::*, error::ConfigError};

const PEM_LABEL: &str = "PRIVATE KEY";
// id-ecPublicKey (RFC 5480).
const EC_PUBLIC_KEY_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
// prime256v1 / secp256r1.
const P256_CURVE_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// Errors produced while turning PEM bytes into a [`SigningKey`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum KeyError {
	/// The input is not a single PKCS#8 `PRIVATE KEY` PEM document.
	#[error("Private key is not a valid PKCS#8 PEM document: {reason}.")]
	InvalidKeyFormat {
		/// What went wrong while decoding.
		reason: String,
	},
	/// The key decoded but is not an ECDSA P-256 key.
	#[error("Private key uses unsupported algorithm {algorithm}; an ECDSA P-256 key is required.")]
	UnsupportedKeyType {
		/// Algorithm (and curve, when present) OID found in the key.
		algorithm: String,
	},
}
impl KeyError {
	fn invalid(reason: impl Display) -> Self {
		Self::InvalidKeyFormat { reason: reason.to_string() }
	}
}

/// ECDSA P-256 private key held for the lifetime of the process.
///
/// The key is never mutated or serialized back out; `Debug` output is redacted.
#[derive(Clone)]
pub struct SigningKey(EcdsaSigningKey);
impl SigningKey {
	/// Parses a PEM document holding exactly one PKCS#8 `PRIVATE KEY` block.
	pub fn from_pem(bytes: impl AsRef<[u8]>) -> Result<Self, KeyError> {
		// Key files are frequently saved with stray blank lines around the block.
		let (label, der) =
			pem::decode_vec(bytes.as_ref().trim_ascii()).map_err(KeyError::invalid)?;

		if label != PEM_LABEL {
			return Err(KeyError::invalid(format_args!(
				"expected a `{PEM_LABEL}` block but found `{label}`"
			)));
		}

		let info = PrivateKeyInfo::try_from(der.as_slice()).map_err(KeyError::invalid)?;

		ensure_p256(&info)?;

		EcdsaSigningKey::try_from(info).map(Self).map_err(KeyError::invalid)
	}

	/// Reads and parses a PEM file from disk.
	pub fn from_pem_file(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let bytes = fs::read(path)
			.map_err(|source| ConfigError::KeyFile { path: path.to_path_buf(), source })?;

		Ok(Self::from_pem(bytes)?)
	}

	/// Public half of the key, for verifying issued tokens.
	pub fn verifying_key(&self) -> VerifyingKey {
		self.0.verifying_key().to_owned()
	}

	pub(crate) fn ecdsa(&self) -> &EcdsaSigningKey {
		&self.0
	}
}
impl From<EcdsaSigningKey> for SigningKey {
	fn from(key: EcdsaSigningKey) -> Self {
		Self(key)
	}
}
impl Debug for SigningKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningKey").field(&"<redacted>").finish()
	}
}

/// Loads an ES256 signing key from PEM bytes.
pub fn load_private_key(bytes: impl AsRef<[u8]>) -> Result<SigningKey, KeyError> {
	SigningKey::from_pem(bytes)
}

fn ensure_p256(info: &PrivateKeyInfo<'_>) -> Result<(), KeyError> {
	let algorithm = info.algorithm.oid;

	if algorithm != EC_PUBLIC_KEY_OID {
		return Err(KeyError::UnsupportedKeyType { algorithm: algorithm.to_string() });
	}

	match info.algorithm.parameters_oid() {
		Ok(curve) if curve == P256_CURVE_OID => Ok(()),
		Ok(curve) =>
			Err(KeyError::UnsupportedKeyType { algorithm: format!("{algorithm}/{curve}") }),
		Err(e) =>
			Err(KeyError::invalid(format_args!("EC key is missing its curve parameter ({e})"))),
	}
}
