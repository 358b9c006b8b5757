//! Crate-level error types shared by key loading, token issuance, transports, and catalog calls.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::{KeyError, TokenError},
	config::CatalogConfigError,
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Private key could not be loaded.
	#[error(transparent)]
	Key(#[from] KeyError),
	/// Token could not be minted.
	#[error(transparent)]
	Token(#[from] TokenError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure; retry with backoff.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}
impl Error {
	/// Classifies the error into the coarse taxonomy used by callers deciding how to react.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Key(KeyError::InvalidKeyFormat { .. }) => ErrorKind::InvalidKeyFormat,
			Self::Key(KeyError::UnsupportedKeyType { .. }) => ErrorKind::UnsupportedKeyType,
			Self::Token(_) => ErrorKind::SigningFailed,
			Self::Config(_) => ErrorKind::Config,
			Self::Transient(_) => ErrorKind::Upstream,
			Self::Transport(_) => ErrorKind::Transport,
		}
	}

	/// Returns `true` when repeating the whole operation may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(self.kind(), ErrorKind::SigningFailed | ErrorKind::Transport | ErrorKind::Upstream)
	}
}

/// Coarse error classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// Malformed PEM or PKCS#8 input; startup must abort.
	InvalidKeyFormat,
	/// Key decoded fine but is not an ECDSA P-256 key.
	UnsupportedKeyType,
	/// ES256 signing failed; the issuance may be retried.
	SigningFailed,
	/// Underlying network failure, passed through untouched.
	Transport,
	/// Local configuration problem.
	Config,
	/// Catalog API answered with an error status or an unreadable body.
	Upstream,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Bearer token cannot be represented as a header value.
	#[error("Bearer token is not a valid header value.")]
	InvalidHeader(#[from] http::header::InvalidHeaderValue),
	/// Configuration values failed validation.
	#[error(transparent)]
	Invalid(#[from] CatalogConfigError),
	/// Required environment variable is absent or empty.
	#[error("Environment variable `{name}` must be set.")]
	MissingEnv {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a URL that cannot be parsed.
	#[error("Environment variable `{name}` is not a valid URL.")]
	InvalidEnvUrl {
		/// Variable name.
		name: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Private key file could not be read.
	#[error("Private key file {} could not be read.", path.display())]
	KeyFile {
		/// Path that was attempted.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants (safe to retry).
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Catalog endpoint answered with a non-success status.
	#[error("Catalog endpoint returned an unexpected response: {message}.")]
	CatalogEndpoint {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Catalog endpoint responded with JSON that does not match the expected shape.
	#[error("Catalog endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP transport reported a failure.
	#[error("Network error occurred while calling the catalog API.")]
	Network {
		/// Transport-specific error, kept intact for downcasting.
		#[source]
		source: BoxError,
	},
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
	fn kinds_follow_the_taxonomy() {
		let invalid: Error = KeyError::InvalidKeyFormat { reason: "no PEM block".into() }.into();
		let unsupported: Error =
			KeyError::UnsupportedKeyType { algorithm: "1.3.101.112".into() }.into();
		let transport: Error = TransportError::network(std::io::Error::other("reset")).into();

		assert_eq!(invalid.kind(), ErrorKind::InvalidKeyFormat);
		assert_eq!(unsupported.kind(), ErrorKind::UnsupportedKeyType);
		assert_eq!(transport.kind(), ErrorKind::Transport);
		assert!(!invalid.is_retryable());
		assert!(transport.is_retryable());
	}

	#[test]
	fn network_errors_keep_their_source() {
		let error: Error = TransportError::network(std::io::Error::other("connection reset")).into();
		let source = StdError::source(&error)
			.expect("Transport error should expose the wrapped network failure as its source.");

		assert_eq!(source.to_string(), "connection reset");
	}
}
