use crate::error::SpotiqError;
use crate::spotify::client::SpotifyClient;
use crate::spotify::models::SearchResults;

/// Result rows requested per record type.
pub const SEARCH_LIMIT: u32 = 5;

impl SpotifyClient {
    /// Full-text search across playlists, artists, tracks and albums.
    pub async fn search(&self, text: &str) -> Result<SearchResults, SpotiqError> {
        self.get_json(
            "/search",
            &[
                ("q", text.to_string()),
                ("type", "album,artist,playlist,track".to_string()),
                ("limit", SEARCH_LIMIT.to_string()),
            ],
        )
        .await
    }
}
