//! Player endpoints: devices, playback state, queue, and the transport
//! controls. Every control first checks that a device exists at all, so a
//! doomed command is caught locally instead of by the vendor.

use reqwest::Method;

use crate::error::SpotiqError;
use crate::spotify::client::SpotifyClient;
use crate::spotify::models::{CurrentlyPlaying, Device, DeviceList, PlayHistoryItem, PlayQueue};

const TRACK_PREFIX: &str = "spotify:track:";
const CONTEXT_PREFIXES: &[&str] = &["spotify:album:", "spotify:artist:", "spotify:playlist:"];

impl SpotifyClient {
    pub async fn devices(&self) -> Result<Vec<Device>, SpotiqError> {
        let list: DeviceList = self.get_json("/me/player/devices", &[]).await?;
        Ok(list.devices)
    }

    /// Transfer playback to a device, starting playback there.
    pub async fn transfer_playback(&self, device_id: &str) -> Result<(), SpotiqError> {
        self.command(
            Method::PUT,
            "/me/player",
            &[],
            Some(&serde_json::json!({ "device_ids": [device_id], "play": true })),
        )
        .await
    }

    /// Playback state, or `None` when nothing is active (204).
    pub async fn currently_playing(&self) -> Result<Option<CurrentlyPlaying>, SpotiqError> {
        self.get_optional("/me/player/currently-playing", &[]).await
    }

    pub async fn play_queue(&self) -> Result<PlayQueue, SpotiqError> {
        self.get_json("/me/player/queue", &[]).await
    }

    pub async fn recently_played(&self, limit: u32) -> Result<Vec<PlayHistoryItem>, SpotiqError> {
        let page: crate::spotify::models::CursorPage<PlayHistoryItem> = self
            .get_json(
                "/me/player/recently-played",
                &[("limit", limit.to_string())],
            )
            .await?;
        Ok(page.items)
    }

    /// Start playback of a URI.
    ///
    /// Tracks cannot be started directly through the player API; the track
    /// is enqueued and then skipped to. Albums, artists and playlists play
    /// as the listening context.
    pub async fn play(&self, uri: &str) -> Result<(), SpotiqError> {
        self.ensure_device().await?;
        if uri.starts_with(TRACK_PREFIX) {
            self.enqueue(uri).await?;
            self.next_raw().await
        } else if CONTEXT_PREFIXES.iter().any(|p| uri.starts_with(p)) {
            self.command(
                Method::PUT,
                "/me/player/play",
                &[],
                Some(&serde_json::json!({ "context_uri": uri })),
            )
            .await
        } else {
            Err(SpotiqError::UnsupportedUri(uri.to_string()))
        }
    }

    pub async fn pause(&self) -> Result<(), SpotiqError> {
        self.ensure_device().await?;
        self.command(Method::PUT, "/me/player/pause", &[], None).await
    }

    /// Resume the current context.
    pub async fn resume(&self) -> Result<(), SpotiqError> {
        self.ensure_device().await?;
        self.command(Method::PUT, "/me/player/play", &[], None).await
    }

    pub async fn skip_next(&self) -> Result<(), SpotiqError> {
        self.ensure_device().await?;
        self.next_raw().await
    }

    pub async fn skip_previous(&self) -> Result<(), SpotiqError> {
        self.ensure_device().await?;
        self.command(Method::POST, "/me/player/previous", &[], None)
            .await
    }

    async fn enqueue(&self, uri: &str) -> Result<(), SpotiqError> {
        self.command(
            Method::POST,
            "/me/player/queue",
            &[("uri", uri.to_string())],
            None,
        )
        .await
    }

    async fn next_raw(&self) -> Result<(), SpotiqError> {
        self.command(Method::POST, "/me/player/next", &[], None).await
    }

    async fn ensure_device(&self) -> Result<(), SpotiqError> {
        if self.devices().await?.is_empty() {
            return Err(SpotiqError::NoDevice);
        }
        Ok(())
    }
}
