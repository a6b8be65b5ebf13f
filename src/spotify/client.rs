use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::Session;
use crate::error::SpotiqError;

/// Thin bearer-authorized client for the Spotify Web API. Every call takes
/// a fresh token snapshot from the session, so a refresh landing mid-query
/// affects at most the calls that snapshotted before it.
pub struct SpotifyClient {
    pub(crate) http: reqwest::Client,
    pub(crate) session: Arc<Session>,
    pub(crate) api_url: String,
}

impl SpotifyClient {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            http: session.http_client(),
            api_url: session.config().api_url.clone(),
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn bearer(&self) -> Result<String, SpotiqError> {
        self.session.bearer_token().ok_or(SpotiqError::AuthRequired)
    }

    /// GET an endpoint that always answers with a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SpotiqError> {
        self.get_optional(path, query)
            .await?
            .ok_or_else(|| SpotiqError::Protocol(format!("Empty response from {path}")))
    }

    /// GET an endpoint that may answer 204 No Content (player state).
    pub(crate) async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, SpotiqError> {
        let token = self.bearer()?;
        debug!(path, "spotify GET");
        let resp = self
            .http
            .get(self.endpoint(path))
            .query(query)
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpotiqError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let body = resp.text().await?;
        if body.is_empty() {
            return Ok(None);
        }
        let parsed = serde_json::from_str(&body)
            .map_err(|e| SpotiqError::Protocol(format!("Bad response from {path}: {e}")))?;
        Ok(Some(parsed))
    }

    /// Issue a player command. Spotify answers these with 204 (sometimes
    /// 200/202); any success status counts, the body is ignored.
    pub(crate) async fn command(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<(), SpotiqError> {
        let token = self.bearer()?;
        debug!(%method, path, "spotify command");
        let mut req = self
            .http
            .request(method, self.endpoint(path))
            .query(query)
            .bearer_auth(token);
        req = match body {
            Some(body) => req.json(body),
            // player PUT/POST endpoints reject requests without a length
            None => req.header(reqwest::header::CONTENT_LENGTH, "0"),
        };
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SpotiqError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;

    #[test]
    fn endpoint_joins_api_base() {
        let session = Arc::new(Session::new(PluginConfig {
            api_url: "http://127.0.0.1:4040/v1".into(),
            ..PluginConfig::default()
        }));
        let client = SpotifyClient::new(session);
        assert_eq!(
            client.endpoint("/me/player/devices"),
            "http://127.0.0.1:4040/v1/me/player/devices"
        );
    }

    #[tokio::test]
    async fn calls_without_token_fail_before_network() {
        // api_url points nowhere reachable; the auth check must fire first.
        let session = Arc::new(Session::new(PluginConfig {
            api_url: "http://127.0.0.1:1/v1".into(),
            ..PluginConfig::default()
        }));
        let client = SpotifyClient::new(session);
        let err = client
            .get_json::<serde_json::Value>("/me", &[])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "auth_required");
    }
}
