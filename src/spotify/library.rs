//! Profile and library endpoints backing the `me` handler.

use crate::error::SpotiqError;
use crate::spotify::client::SpotifyClient;
use crate::spotify::models::{
    Artist, FollowedArtists, Page, Playlist, PrivateUser, SavedAlbum, SavedTrack,
};

const LIBRARY_PAGE: u32 = 20;

impl SpotifyClient {
    pub async fn profile(&self) -> Result<PrivateUser, SpotiqError> {
        self.get_json("/me", &[]).await
    }

    pub async fn playlists(&self) -> Result<Page<Playlist>, SpotiqError> {
        self.get_json("/me/playlists", &[("limit", LIBRARY_PAGE.to_string())])
            .await
    }

    pub async fn followed_artists(&self) -> Result<Vec<Artist>, SpotiqError> {
        let followed: FollowedArtists = self
            .get_json(
                "/me/following",
                &[
                    ("type", "artist".to_string()),
                    ("limit", LIBRARY_PAGE.to_string()),
                ],
            )
            .await?;
        Ok(followed.artists.items)
    }

    pub async fn saved_tracks(&self) -> Result<Page<SavedTrack>, SpotiqError> {
        self.get_json("/me/tracks", &[("limit", LIBRARY_PAGE.to_string())])
            .await
    }

    pub async fn saved_albums(&self) -> Result<Page<SavedAlbum>, SpotiqError> {
        self.get_json("/me/albums", &[("limit", LIBRARY_PAGE.to_string())])
            .await
    }
}
