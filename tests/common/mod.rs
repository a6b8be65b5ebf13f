use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spotiq::{HostHandle, PluginConfig, SpotiqError};

/// A plugin→host call captured by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum HostEvent {
    ChangeQuery(String),
    ShowApp,
    StoreSetting { key: String, value: String },
}

/// Host handle that records every call for later assertions.
#[derive(Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    #[allow(dead_code)]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[allow(dead_code)]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostHandle for RecordingHost {
    async fn change_query(&self, query: &str) -> Result<(), SpotiqError> {
        self.events
            .lock()
            .unwrap()
            .push(HostEvent::ChangeQuery(query.to_string()));
        Ok(())
    }

    async fn show_app(&self) -> Result<(), SpotiqError> {
        self.events.lock().unwrap().push(HostEvent::ShowApp);
        Ok(())
    }

    async fn store_setting(&self, key: &str, value: &str) -> Result<(), SpotiqError> {
        self.events.lock().unwrap().push(HostEvent::StoreSetting {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

/// Plugin config pointed at mock accounts and API servers.
#[allow(dead_code)]
pub fn test_config(accounts: &MockServer, api: &MockServer) -> PluginConfig {
    PluginConfig {
        accounts_url: accounts.uri(),
        api_url: api.uri(),
        ..PluginConfig::default()
    }
}

/// Mount a successful authorization-code exchange on the accounts server.
#[allow(dead_code)]
pub async fn mount_code_exchange(server: &MockServer, access_token: &str) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "scope": "user-read-private",
            "expires_in": 3600,
            "refresh_token": "refresh-1",
        })))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn track_json(id: &str, name: &str, artist: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "uri": format!("spotify:track:{id}"),
        "duration_ms": 215000,
        "artists": [{"id": "a1", "name": artist, "uri": "spotify:artist:a1"}],
        "album": {
            "id": "al1",
            "name": "Record",
            "uri": "spotify:album:al1",
            "images": [{"url": "https://i/cover.jpg", "height": 640, "width": 640}],
            "release_date": "2021-03-05"
        }
    })
}

#[allow(dead_code)]
pub fn devices_json(active_name: Option<&str>, inactive_name: Option<&str>) -> serde_json::Value {
    let mut devices = Vec::new();
    if let Some(name) = active_name {
        devices.push(json!({
            "id": "dev-active",
            "name": name,
            "type": "Computer",
            "is_active": true
        }));
    }
    if let Some(name) = inactive_name {
        devices.push(json!({
            "id": "dev-idle",
            "name": name,
            "type": "Speaker",
            "is_active": false
        }));
    }
    json!({ "devices": devices })
}
