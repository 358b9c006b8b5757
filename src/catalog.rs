//! Catalog search client and the startup sequence that wires keys, tokens, and transport.
//!
//! [`CatalogClient`] is the context object callers build once at startup and share by
//! reference (it is cheap to clone). Every search goes through an [`AuthenticatingTransport`],
//! so the developer token is minted lazily on first use and reused until it expires.

mod response;

// crates.io
use http::{Method, header::ACCEPT};
// self
use crate::{
	_prelude::*,
	auth::{SigningKey, TokenIssuer},
	cache::TokenCache,
	catalog::response::{AlbumResource, SearchResponse},
	config::CatalogConfig,
	error::{ConfigError, TransientError},
	http::{AuthenticatingTransport, HttpResponse, HttpTransport, parse_retry_after},
	obs::{self, OperationKind, OperationSpan, Outcome},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Edge length used for the small artwork rendition.
pub const SMALL_ARTWORK_SIZE: u32 = 500;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestCatalogClient = CatalogClient<ReqwestTransport>;

/// Album summary returned to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
	/// Album title.
	pub name: String,
	/// Credited artist.
	#[serde(rename = "artist-name")]
	pub artist_name: String,
	/// Artwork URL rendered at 500x500.
	#[serde(rename = "artwork-small")]
	pub artwork_small: String,
	/// Artwork URL rendered at the original size.
	pub artwork: String,
}
impl From<AlbumResource> for Album {
	fn from(resource: AlbumResource) -> Self {
		let attributes = resource.attributes;
		let artwork = &attributes.artwork;

		Self {
			artwork: artwork.sized(artwork.width, artwork.height),
			artwork_small: artwork.sized(SMALL_ARTWORK_SIZE, SMALL_ARTWORK_SIZE),
			name: attributes.name,
			artist_name: attributes.artist_name,
		}
	}
}

/// Authenticated catalog search client.
pub struct CatalogClient<T>
where
	T: HttpTransport,
{
	transport: Arc<AuthenticatingTransport<T>>,
	config: Arc<CatalogConfig>,
}
impl<T> CatalogClient<T>
where
	T: HttpTransport,
{
	/// Wires `key` and `config` into a token cache and wraps `transport` with it.
	pub fn new(config: CatalogConfig, key: SigningKey, transport: T) -> Self {
		let issuer = TokenIssuer::new(key, config.issuer.as_str(), config.key_id.as_str())
			.with_lifetime(config.token_lifetime);
		let cache = TokenCache::new(issuer).with_refresh_leeway(config.refresh_leeway);

		Self::with_transport(config, AuthenticatingTransport::new(transport, Arc::new(cache)))
	}

	/// Uses an already assembled authenticating transport.
	pub fn with_transport(config: CatalogConfig, transport: AuthenticatingTransport<T>) -> Self {
		Self { transport: Arc::new(transport), config: Arc::new(config) }
	}

	/// Active configuration.
	pub fn config(&self) -> &CatalogConfig {
		&self.config
	}

	/// Authenticating transport used for every call.
	pub fn transport(&self) -> &AuthenticatingTransport<T> {
		&self.transport
	}

	/// Shared developer token cache.
	pub fn token_cache(&self) -> &Arc<TokenCache> {
		self.transport.cache()
	}

	/// Searches the catalog for albums matching `term`.
	pub async fn search_albums(&self, term: &str) -> Result<Vec<Album>> {
		const KIND: OperationKind = OperationKind::CatalogSearch;

		let span = OperationSpan::new(KIND, "search_albums");

		obs::record_outcome(KIND, Outcome::Attempt);

		let result = span
			.instrument(async move {
				let request = self.search_request(term)?;
				let response = self.transport.send(request).await?;

				parse_search_response(response)
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, Outcome::Success),
			Err(_) => obs::record_outcome(KIND, Outcome::Failure),
		}

		result
	}

	/// Builds the search URL for `term`.
	pub fn search_url(&self, term: &str) -> Url {
		let mut url = self.config.search_endpoint.clone();

		url.query_pairs_mut()
			.append_pair("limit", &self.config.result_limit.to_string())
			.append_pair("term", term)
			.append_pair("types", "albums")
			.append_pair("with", "topResults");

		url
	}

	fn search_request(&self, term: &str) -> Result<http::Request<Vec<u8>>> {
		http::Request::builder()
			.method(Method::GET)
			.uri(self.search_url(term).as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(|e| ConfigError::from(e).into())
	}
}
#[cfg(feature = "reqwest")]
impl CatalogClient<ReqwestTransport> {
	/// Builds a client backed by reqwest with the configured request timeout.
	pub fn from_config(config: CatalogConfig, key: SigningKey) -> Result<Self> {
		let transport = ReqwestTransport::with_timeout(config.request_timeout)?;

		Ok(Self::new(config, key, transport))
	}

	/// Runs the whole startup sequence from the process environment.
	///
	/// Reads the configuration and key path, loads the key, and builds the client. Failures are
	/// returned to the caller, which decides whether to abort.
	pub fn from_env() -> Result<Self> {
		let config = CatalogConfig::from_env()?;
		let key = SigningKey::from_pem_file(CatalogConfig::private_key_path_from_env()?)?;

		Self::from_config(config, key)
	}
}
impl<T> Clone for CatalogClient<T>
where
	T: HttpTransport,
{
	fn clone(&self) -> Self {
		Self { transport: Arc::clone(&self.transport), config: Arc::clone(&self.config) }
	}
}
impl<T> Debug for CatalogClient<T>
where
	T: HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CatalogClient")
			.field("config", &self.config)
			.field("transport", &self.transport)
			.finish()
	}
}

fn parse_search_response(response: HttpResponse) -> Result<Vec<Album>> {
	let status = response.status();

	if !status.is_success() {
		return Err(TransientError::CatalogEndpoint {
			message: format!("search returned HTTP {status}"),
			status: Some(status.as_u16()),
			retry_after: parse_retry_after(response.headers()),
		}
		.into());
	}

	let mut deserializer = serde_json::Deserializer::from_slice(response.body());
	let parsed: SearchResponse = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransientError::ResponseParse { source, status: Some(status.as_u16()) })?;

	Ok(parsed.results.albums.data.into_iter().map(Album::from).collect())
}
