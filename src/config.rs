//! Validated configuration for the catalog client and its token issuer.

// std
use std::{env, path::PathBuf};
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable holding the developer key identifier (`kid`).
pub const KEY_ID_ENV: &str = "APPLE_MUSIC_KEY_ID";
/// Environment variable holding the developer team identifier (`iss`).
pub const TEAM_ID_ENV: &str = "APPLE_TEAM_ID";
/// Environment variable pointing at the `.p8` private key file.
pub const PRIVATE_KEY_PATH_ENV: &str = "APPLE_PRIVATE_KEY_PATH";
/// Optional environment variable overriding the search endpoint.
pub const SEARCH_URL_ENV: &str = "APPLE_MUSIC_SEARCH_URL";

/// Maximum page size accepted by the catalog search endpoint.
pub const MAX_RESULT_LIMIT: u8 = 25;

const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.music.apple.com/v1/catalog/us/search";
const IDENTIFIER_MAX_LEN: usize = 128;

/// Errors raised while validating a [`CatalogConfig`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum CatalogConfigError {
	/// Identifier was empty.
	#[error("The {field} must not be empty.")]
	EmptyIdentifier {
		/// Which identifier failed validation.
		field: &'static str,
	},
	/// Identifier contains whitespace or exceeds the length limit.
	#[error("The {field} must be at most {max} characters without whitespace.")]
	MalformedIdentifier {
		/// Which identifier failed validation.
		field: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// Token lifetime must be at least one second.
	#[error("Token lifetime must be at least one second.")]
	NonPositiveLifetime,
	/// Refresh leeway must be non-negative and shorter than the lifetime.
	#[error("Refresh leeway must be non-negative and shorter than the token lifetime.")]
	InvalidLeeway,
	/// Result limit must be within `1..=MAX_RESULT_LIMIT`.
	#[error("Result limit must be between 1 and {max}, got {limit}.")]
	ResultLimitOutOfRange {
		/// Rejected limit.
		limit: u8,
		/// Maximum accepted limit.
		max: u8,
	},
	/// Search endpoint cannot be parsed.
	#[error("The search endpoint is not a valid URL: {url}.")]
	InvalidEndpoint {
		/// Endpoint that failed to parse.
		url: String,
	},
	/// Search endpoint must be an HTTP(S) URL.
	#[error("The search endpoint must use http or https: {url}.")]
	UnsupportedScheme {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Request timeout must be positive.
	#[error("Request timeout must be positive.")]
	NonPositiveTimeout,
}

/// Immutable configuration consumed by [`CatalogClient`](crate::catalog::CatalogClient).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogConfig {
	/// Key identifier placed in the JWT `kid` header.
	pub key_id: String,
	/// Team identifier placed in the JWT `iss` claim.
	pub issuer: String,
	/// Validity window of each developer token.
	pub token_lifetime: Duration,
	/// How long before expiry a cached token is replaced.
	pub refresh_leeway: Duration,
	/// Catalog search endpoint.
	pub search_endpoint: Url,
	/// Number of albums requested per search.
	pub result_limit: u8,
	/// Timeout applied to each outbound request.
	pub request_timeout: Duration,
}
impl CatalogConfig {
	/// Default developer token lifetime.
	pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::hours(24);
	/// Default outbound request timeout.
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(5);

	/// Creates a new builder for the provided key and team identifiers.
	pub fn builder(key_id: impl Into<String>, issuer: impl Into<String>) -> CatalogConfigBuilder {
		CatalogConfigBuilder::new(key_id, issuer)
	}

	/// Builds a configuration from `APPLE_MUSIC_KEY_ID`, `APPLE_TEAM_ID`, and the optional
	/// `APPLE_MUSIC_SEARCH_URL`.
	pub fn from_env() -> Result<Self, ConfigError> {
		let mut builder = Self::builder(required_env(KEY_ID_ENV)?, required_env(TEAM_ID_ENV)?);

		if let Some(raw) = optional_env(SEARCH_URL_ENV) {
			let url = Url::parse(&raw)
				.map_err(|source| ConfigError::InvalidEnvUrl { name: SEARCH_URL_ENV, source })?;

			builder = builder.search_endpoint(url);
		}

		Ok(builder.build()?)
	}

	/// Reads the private key location from `APPLE_PRIVATE_KEY_PATH`.
	pub fn private_key_path_from_env() -> Result<PathBuf, ConfigError> {
		required_env(PRIVATE_KEY_PATH_ENV).map(PathBuf::from)
	}

	fn validate(&self) -> Result<(), CatalogConfigError> {
		validate_identifier("key identifier", &self.key_id)?;
		validate_identifier("issuer", &self.issuer)?;

		if self.token_lifetime < Duration::SECOND {
			return Err(CatalogConfigError::NonPositiveLifetime);
		}
		if self.refresh_leeway.is_negative() || self.refresh_leeway >= self.token_lifetime {
			return Err(CatalogConfigError::InvalidLeeway);
		}
		if !(1..=MAX_RESULT_LIMIT).contains(&self.result_limit) {
			return Err(CatalogConfigError::ResultLimitOutOfRange {
				limit: self.result_limit,
				max: MAX_RESULT_LIMIT,
			});
		}
		if !matches!(self.search_endpoint.scheme(), "http" | "https") {
			return Err(CatalogConfigError::UnsupportedScheme {
				url: self.search_endpoint.to_string(),
			});
		}
		if !self.request_timeout.is_positive() {
			return Err(CatalogConfigError::NonPositiveTimeout);
		}

		Ok(())
	}
}

/// Builder for [`CatalogConfig`] values.
#[derive(Debug)]
pub struct CatalogConfigBuilder {
	/// Key identifier placed in the JWT `kid` header.
	pub key_id: String,
	/// Team identifier placed in the JWT `iss` claim.
	pub issuer: String,
	/// Optional token lifetime override.
	pub token_lifetime: Option<Duration>,
	/// Optional refresh leeway override.
	pub refresh_leeway: Option<Duration>,
	/// Optional search endpoint override.
	pub search_endpoint: Option<Url>,
	/// Optional result limit override.
	pub result_limit: Option<u8>,
	/// Optional request timeout override.
	pub request_timeout: Option<Duration>,
}
impl CatalogConfigBuilder {
	/// Creates a new builder seeded with the provided identifiers.
	pub fn new(key_id: impl Into<String>, issuer: impl Into<String>) -> Self {
		Self {
			key_id: key_id.into(),
			issuer: issuer.into(),
			token_lifetime: None,
			refresh_leeway: None,
			search_endpoint: None,
			result_limit: None,
			request_timeout: None,
		}
	}

	/// Overrides the token lifetime (defaults to 24 hours).
	pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
		self.token_lifetime = Some(lifetime);

		self
	}

	/// Overrides the refresh leeway (defaults to zero).
	pub fn refresh_leeway(mut self, leeway: Duration) -> Self {
		self.refresh_leeway = Some(leeway);

		self
	}

	/// Overrides the search endpoint.
	pub fn search_endpoint(mut self, url: Url) -> Self {
		self.search_endpoint = Some(url);

		self
	}

	/// Overrides the number of albums requested per search (defaults to 25).
	pub fn result_limit(mut self, limit: u8) -> Self {
		self.result_limit = Some(limit);

		self
	}

	/// Overrides the per-request timeout (defaults to 5 seconds).
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<CatalogConfig, CatalogConfigError> {
		let search_endpoint = match self.search_endpoint {
			Some(url) => url,
			None => Url::parse(DEFAULT_SEARCH_ENDPOINT).map_err(|_| {
				CatalogConfigError::InvalidEndpoint { url: DEFAULT_SEARCH_ENDPOINT.into() }
			})?,
		};
		let config = CatalogConfig {
			key_id: self.key_id,
			issuer: self.issuer,
			token_lifetime: self.token_lifetime.unwrap_or(CatalogConfig::DEFAULT_TOKEN_LIFETIME),
			refresh_leeway: self.refresh_leeway.unwrap_or(Duration::ZERO),
			search_endpoint,
			result_limit: self.result_limit.unwrap_or(MAX_RESULT_LIMIT),
			request_timeout: self.request_timeout.unwrap_or(CatalogConfig::DEFAULT_REQUEST_TIMEOUT),
		};

		config.validate()?;

		Ok(config)
	}
}

fn validate_identifier(field: &'static str, value: &str) -> Result<(), CatalogConfigError> {
	if value.is_empty() {
		return Err(CatalogConfigError::EmptyIdentifier { field });
	}
	if value.chars().any(char::is_whitespace) || value.len() > IDENTIFIER_MAX_LEN {
		return Err(CatalogConfigError::MalformedIdentifier { field, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

fn required_env(name: &'static str) -> Result<String, ConfigError> {
	optional_env(name).ok_or(ConfigError::MissingEnv { name })
}

fn optional_env(name: &str) -> Option<String> {
	env::var(name).ok().map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
}
