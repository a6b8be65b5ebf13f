//! Preview shaping for launcher list items.

use std::collections::BTreeMap;

use crate::host::types::ItemPreview;
use crate::spotify::models::{Artist, Image, Track};

/// Milliseconds to "m:ss".
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

fn cover_markdown(name: &str, images: &[Image]) -> String {
    match images.first() {
        Some(image) => format!("![{}]({})", name, image.url),
        None => String::new(),
    }
}

/// Album art plus Album / Duration / Release properties.
pub fn track_preview(track: &Track) -> ItemPreview {
    let mut properties = BTreeMap::new();
    properties.insert("Duration".to_string(), format_duration(track.duration_ms));
    let markdown = match &track.album {
        Some(album) => {
            properties.insert("Album".to_string(), album.name.clone());
            if let Some(release) = &album.release_date {
                properties.insert("Release".to_string(), release.clone());
            }
            cover_markdown(&track.name, &album.images)
        }
        None => String::new(),
    };
    ItemPreview {
        markdown,
        properties,
    }
}

/// Cover image only.
pub fn image_preview(name: &str, images: &[Image]) -> ItemPreview {
    ItemPreview {
        markdown: cover_markdown(name, images),
        properties: BTreeMap::new(),
    }
}

/// Artist image plus follower and popularity counts.
pub fn artist_preview(artist: &Artist) -> ItemPreview {
    let mut properties = BTreeMap::new();
    if let Some(followers) = &artist.followers {
        properties.insert("Followers".to_string(), followers.total.to_string());
    }
    if let Some(popularity) = artist.popularity {
        properties.insert("Popularity".to_string(), popularity.to_string());
    }
    ItemPreview {
        markdown: cover_markdown(&artist.name, &artist.images),
        properties,
    }
}
