// crates.io
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use catalog_auth::{
	auth::SigningKey,
	catalog::{Album, ReqwestCatalogClient},
	config::CatalogConfig,
	error::{Error, ErrorKind, TransientError},
};

const SEARCH_PATH: &str = "/v1/catalog/us/search";
const ABBEY_ROAD: &str = r#"{"results":{"albums":{"data":[{"id":"1441164426","type":"albums","attributes":{
	"artistName":"The Beatles",
	"name":"Abbey Road (Remastered)",
	"artwork":{"width":1400,"height":1400,"url":"https://is1-ssl.mzstatic.com/image/{w}x{h}bb.jpg"}
}}]}}}"#;

fn signing_key() -> SigningKey {
	let secret = p256::SecretKey::from_slice(&[0x22; 32])
		.expect("Fixed test scalar should be a valid P-256 secret.");

	SigningKey::from(p256::ecdsa::SigningKey::from(secret))
}

fn build_client(server: &MockServer, limit: u8) -> ReqwestCatalogClient {
	let config = CatalogConfig::builder("KEYID456", "TEAM123")
		.search_endpoint(
			Url::parse(&server.url(SEARCH_PATH)).expect("Mock search endpoint should parse."),
		)
		.result_limit(limit)
		.build()
		.expect("Catalog configuration should validate.");

	ReqwestCatalogClient::from_config(config, signing_key()).expect("Reqwest client should build.")
}

#[tokio::test]
async fn search_sends_bearer_token_and_query() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, 10);
	let token = client
		.token_cache()
		.token(OffsetDateTime::now_utc())
		.expect("Developer token should be issued.");
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(SEARCH_PATH)
				.query_param("limit", "10")
				.query_param("term", "abbey")
				.query_param("types", "albums")
				.query_param("with", "topResults")
				.header("accept", "application/json")
				.header("authorization", format!("Bearer {}", token.expose()));
			then.status(200).header("content-type", "application/json").body(ABBEY_ROAD);
		})
		.await;
	let albums = client.search_albums("abbey").await.expect("Search should succeed.");

	mock.assert_async().await;

	assert_eq!(albums, vec![Album {
		name: "Abbey Road (Remastered)".into(),
		artist_name: "The Beatles".into(),
		artwork_small: "https://is1-ssl.mzstatic.com/image/500x500bb.jpg".into(),
		artwork: "https://is1-ssl.mzstatic.com/image/1400x1400bb.jpg".into(),
	}]);
	assert_eq!(client.token_cache().metrics().issued(), 1);
}

#[tokio::test]
async fn repeated_searches_reuse_one_token() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, 25);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH).header_exists("authorization");
			then.status(200).header("content-type", "application/json").body(r#"{"results":{}}"#);
		})
		.await;

	for _ in 0..3 {
		let albums =
			client.clone().search_albums("nothing").await.expect("Search should succeed.");

		assert!(albums.is_empty());
	}

	mock.assert_calls_async(3).await;

	assert_eq!(client.token_cache().metrics().issued(), 1);
	assert_eq!(client.token_cache().metrics().hits(), 2);
}

#[tokio::test]
async fn throttled_search_surfaces_retry_hint() {
	let server = MockServer::start_async().await;
	let client = build_client(&server, 25);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path(SEARCH_PATH);
			then.status(429).header("retry-after", "7");
		})
		.await;
	let err = client.search_albums("abbey").await.expect_err("Throttled search should fail.");

	mock.assert_async().await;

	assert_eq!(err.kind(), ErrorKind::Upstream);
	assert!(err.is_retryable());

	match err {
		Error::Transient(TransientError::CatalogEndpoint { status, retry_after, .. }) => {
			assert_eq!(status, Some(429));
			assert_eq!(retry_after, Some(Duration::seconds(7)));
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
	let config = CatalogConfig::builder("KEYID456", "TEAM123")
		.search_endpoint(Url::parse("http://127.0.0.1:9/search").expect("URL should parse."))
		.request_timeout(Duration::seconds(2))
		.build()
		.expect("Catalog configuration should validate.");
	let client = ReqwestCatalogClient::from_config(config, signing_key())
		.expect("Reqwest client should build.");
	let err = client.search_albums("abbey").await.expect_err("Closed port should fail.");

	assert_eq!(err.kind(), ErrorKind::Transport);
	// The token was still minted before the network call.
	assert_eq!(client.token_cache().metrics().issued(), 1);
}
