//! Searches the catalog for albums using credentials from the environment.
//!
//! ```sh
//! export APPLE_MUSIC_KEY_ID=KEYID456
//! export APPLE_TEAM_ID=TEAM123
//! export APPLE_PRIVATE_KEY_PATH=./AuthKey_KEYID456.p8
//! cargo run --example search -- "abbey road"
//! ```
//!
//! Startup aborts with a report when any variable is missing or the key cannot be parsed. The
//! second search reuses the developer token minted by the first one.

// std
use std::env;
// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use catalog_auth::catalog::ReqwestCatalogClient;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let term = env::args().nth(1).ok_or_else(|| eyre!("usage: search <term>"))?;
	let client = ReqwestCatalogClient::from_env()?;
	let albums = client.search_albums(&term).await?;

	println!("{}", serde_json::to_string_pretty(&albums)?);

	if let Some(first) = albums.first() {
		let related = client.search_albums(&first.artist_name).await?;

		println!("{} more albums by {}", related.len(), first.artist_name);
	}

	let metrics = client.token_cache().metrics();

	println!("tokens issued: {}, cache hits: {}", metrics.issued(), metrics.hits());

	Ok(())
}
