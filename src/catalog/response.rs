//! Wire shapes of the catalog search response.
//!
//! Only the fields the client reads are modelled. The API omits `albums` entirely when nothing
//! matches, so every container defaults to empty. Missing album attributes fall back to empty
//! values so one sparse album does not discard the rest of the page.

// self
use crate::_prelude::*;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
	#[serde(default)]
	pub(crate) results: SearchResults,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResults {
	#[serde(default)]
	pub(crate) albums: AlbumPage,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlbumPage {
	#[serde(default)]
	pub(crate) data: Vec<AlbumResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumResource {
	#[serde(default)]
	pub(crate) attributes: AlbumAttributes,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AlbumAttributes {
	pub(crate) artist_name: String,
	pub(crate) artwork: Artwork,
	pub(crate) name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Artwork {
	pub(crate) height: u32,
	pub(crate) width: u32,
	pub(crate) url: String,
}
impl Artwork {
	/// Fills the `{w}`/`{h}` placeholders of the URL template.
	pub(crate) fn sized(&self, width: u32, height: u32) -> String {
		self.url.replace("{w}", &width.to_string()).replace("{h}", &height.to_string())
	}
}
