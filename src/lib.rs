//! Developer-token authentication for catalog search: ES256 JWT signing, a lazily refreshed
//! token cache, and an HTTP transport that stamps every request with `Authorization: Bearer`.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and fixtures for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use parking_lot::Mutex;

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	use p256::pkcs8::{EncodePrivateKey, LineEnding};
	use serde::de::DeserializeOwned;
	// self
	use crate::auth::SigningKey;

	const TEST_SCALAR: [u8; 32] = [0x11; 32];

	/// Deterministic P-256 key used across tests.
	pub fn test_signing_key() -> SigningKey {
		let secret = p256::SecretKey::from_slice(&TEST_SCALAR)
			.expect("Fixed test scalar should be a valid P-256 secret.");

		SigningKey::from(p256::ecdsa::SigningKey::from(secret))
	}

	/// PKCS#8 PEM encoding of [`test_signing_key`].
	pub fn test_private_key_pem() -> String {
		let secret = p256::SecretKey::from_slice(&TEST_SCALAR)
			.expect("Fixed test scalar should be a valid P-256 secret.");

		secret
			.to_pkcs8_pem(LineEnding::LF)
			.expect("Test key should encode as PKCS#8 PEM.")
			.as_str()
			.to_owned()
	}

	/// Returns the raw base64url text of segment `index` of a compact JWT.
	pub fn raw_segment(token: impl AsRef<str>, index: usize) -> String {
		token
			.as_ref()
			.split('.')
			.nth(index)
			.expect("Compact JWT should contain the requested segment.")
			.to_owned()
	}

	/// Decodes segment `index` of a compact JWT as JSON.
	pub fn decode_segment<T>(token: impl AsRef<str>, index: usize) -> T
	where
		T: DeserializeOwned,
	{
		let bytes = URL_SAFE_NO_PAD
			.decode(raw_segment(token, index))
			.expect("JWT segment should be unpadded base64url.");

		serde_json::from_slice(&bytes).expect("JWT segment should be valid JSON.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
