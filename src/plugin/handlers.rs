//! The per-command query handlers. Each one reads from the vendor API and
//! shapes the records into launcher list items; the dispatch layer in
//! `plugin::SpotifyPlugin::query` owns the degrade-to-empty policy.

use crate::error::SpotiqError;
use crate::host::types::{ActionCommand, ItemAction, ItemIcon, ListItem, PluginQuery};
use crate::plugin::render::{artist_preview, image_preview, track_preview};
use crate::plugin::SpotifyPlugin;
use crate::spotify::models::Track;

fn play_action(uri: &str) -> ItemAction {
    ItemAction::new(
        "Play",
        ActionCommand::Play {
            uri: uri.to_string(),
        },
    )
}

fn track_item(track: &Track) -> ListItem {
    ListItem::new(&track.name)
        .subtitle(format!("by {}", track.artist_names()))
        .preview(track_preview(track))
}

impl SpotifyPlugin {
    /// The single result shown whenever no usable token is held (or the
    /// user asked for `auth` explicitly).
    pub(crate) fn auth_prompt(&self) -> Vec<ListItem> {
        vec![ListItem::new("Authenticate")
            .subtitle("select this to authenticate with Spotify")
            .action(ItemAction::new("Auth", ActionCommand::BeginAuth))]
    }

    pub(crate) async fn list_devices(
        &self,
        query: &PluginQuery,
    ) -> Result<Vec<ListItem>, SpotiqError> {
        let devices = self.client.devices().await?;
        Ok(devices
            .into_iter()
            .map(|device| {
                let title = if device.is_active {
                    format!("{} - Active", device.name)
                } else {
                    device.name.clone()
                };
                let mut item = ListItem::new(title).subtitle(&device.kind);
                if let (false, Some(id)) = (device.is_active, device.id) {
                    item = item.action(
                        ItemAction::new(
                            "Activate",
                            ActionCommand::ActivateDevice {
                                device_id: id,
                                requery: query.raw.clone(),
                            },
                        )
                        .keep_visible(),
                    );
                }
                item
            })
            .collect())
    }

    /// Default handler: the current track with transport actions,
    /// followed by the play queue.
    pub(crate) async fn now_playing(&self) -> Result<Vec<ListItem>, SpotiqError> {
        let current = match self.client.currently_playing().await? {
            Some(state) => state,
            None => return Ok(vec![]),
        };
        let track = match current.item {
            Some(track) => track,
            None => return Ok(vec![]),
        };

        let transport = if current.is_playing {
            ItemAction::new("Pause", ActionCommand::Pause)
        } else {
            ItemAction::new("Resume", ActionCommand::Resume)
        };
        let mut items = vec![track_item(&track)
            .group("Playing", 100)
            .action(transport)
            .action(ItemAction::new("Next", ActionCommand::Next))
            .action(ItemAction::new("Previous", ActionCommand::Previous))];

        let queue = self.client.play_queue().await?;
        items.extend(queue.queue.iter().map(|track| {
            track_item(track)
                .group("Queue", 90)
                .action(play_action(&track.uri))
        }));
        Ok(items)
    }

    pub(crate) async fn user_queue(&self) -> Result<Vec<ListItem>, SpotiqError> {
        let queue = self.client.play_queue().await?;
        Ok(queue
            .queue
            .iter()
            .map(|track| track_item(track).action(play_action(&track.uri)))
            .collect())
    }

    pub(crate) async fn show_recent(&self) -> Result<Vec<ListItem>, SpotiqError> {
        let recent = self.client.recently_played(20).await?;
        Ok(recent.iter().map(|item| track_item(&item.track)).collect())
    }

    pub(crate) async fn show_search(
        &self,
        query: &PluginQuery,
    ) -> Result<Vec<ListItem>, SpotiqError> {
        if query.search.is_empty() {
            return Ok(vec![
                ListItem::new("Search").subtitle("enter a search query")
            ]);
        }

        let results = self.client.search(&query.search).await?;
        let mut items = Vec::new();

        if let Some(playlists) = results.playlists {
            items.extend(playlists.items.iter().map(|playlist| {
                ListItem::new(&playlist.name)
                    .group("Playlists", 170)
                    .preview(image_preview(&playlist.name, &playlist.images))
                    .action(play_action(&playlist.uri))
            }));
        }
        if let Some(artists) = results.artists {
            items.extend(artists.items.iter().map(|artist| {
                ListItem::new(&artist.name)
                    .group("Artists", 150)
                    .preview(artist_preview(artist))
                    .action(play_action(&artist.uri))
            }));
        }
        if let Some(tracks) = results.tracks {
            items.extend(tracks.items.iter().map(|track| {
                track_item(track)
                    .group("Tracks", 100)
                    .action(play_action(&track.uri))
            }));
        }
        if let Some(albums) = results.albums {
            items.extend(albums.items.iter().map(|album| {
                let artists = album
                    .artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                ListItem::new(&album.name)
                    .subtitle(format!("by {artists}"))
                    .group("Albums", 90)
                    .preview(image_preview(&album.name, &album.images))
                    .action(play_action(&album.uri))
            }));
        }
        Ok(items)
    }

    /// Profile plus the user's library, grouped.
    pub(crate) async fn me(&self) -> Result<Vec<ListItem>, SpotiqError> {
        let profile = self.client.profile().await?;

        let icon = profile
            .images
            .first()
            .map(|image| ItemIcon::url(&image.url))
            .unwrap_or_else(ItemIcon::app);
        let mut preview = image_preview("", &[]);
        preview
            .properties
            .insert("UserId".to_string(), profile.id.clone());
        if let Some(email) = &profile.email {
            preview.properties.insert("Email".to_string(), email.clone());
        }
        let display_name = profile.display_name.unwrap_or(profile.id);
        let mut items = vec![ListItem::new(display_name)
            .icon(icon)
            .group("User", 100)
            .preview(preview)];

        let playlists = self.client.playlists().await?;
        items.extend(playlists.items.iter().map(|playlist| {
            ListItem::new(&playlist.name)
                .group("Playlists", 90)
                .preview(image_preview(&playlist.name, &playlist.images))
                .action(play_action(&playlist.uri))
        }));

        let artists = self.client.followed_artists().await?;
        items.extend(artists.iter().map(|artist| {
            let mut item = ListItem::new(&artist.name)
                .group("Artists", 80)
                .preview(artist_preview(artist))
                .action(play_action(&artist.uri));
            if let Some(popularity) = artist.popularity {
                item = item.score(popularity);
            }
            item
        }));

        let tracks = self.client.saved_tracks().await?;
        items.extend(tracks.items.iter().map(|saved| {
            track_item(&saved.track)
                .group("Tracks", 70)
                .action(play_action(&saved.track.uri))
        }));

        let albums = self.client.saved_albums().await?;
        items.extend(albums.items.iter().map(|saved| {
            let artists = saved
                .album
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            ListItem::new(&saved.album.name)
                .subtitle(format!("by {artists}"))
                .group("Albums", 60)
                .preview(image_preview(&saved.album.name, &saved.album.images))
        }));

        Ok(items)
    }

    /// `next` command: act immediately, show nothing.
    pub(crate) async fn skip_to_next(&self) -> Result<Vec<ListItem>, SpotiqError> {
        self.client.skip_next().await?;
        Ok(vec![])
    }
}
