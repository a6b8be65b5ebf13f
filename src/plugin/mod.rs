pub mod handlers;
pub mod render;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::auth::{persist_token, RefreshScheduler, Session, Token};
use crate::config::{PluginConfig, TOKEN_SETTING_KEY};
use crate::error::SpotiqError;
use crate::host::api::HostHandle;
use crate::host::types::{ActionCommand, DeepLink, ListItem, PluginQuery};
use crate::spotify::SpotifyClient;

/// Deep-link `action` value that completes an authorization attempt.
pub const AUTH_DEEP_LINK_ACTION: &str = "spotify-auth";

/// Query-box text to restore after a completed authorization.
const TRIGGER_RESET: &str = "spotify ";

/// How long a device transfer gets before the device list is re-queried.
const ACTIVATE_SETTLE: Duration = Duration::from_secs(1);

/// The plugin instance: owns the session, the vendor client and the
/// refresh scheduler, and holds the handle back into the host.
pub struct SpotifyPlugin {
    pub(crate) session: Arc<Session>,
    pub(crate) client: SpotifyClient,
    pub(crate) scheduler: RefreshScheduler,
    pub(crate) host: Arc<dyn HostHandle>,
}

impl SpotifyPlugin {
    pub fn new(config: PluginConfig, host: Arc<dyn HostHandle>) -> Self {
        let session = Arc::new(Session::new(config));
        let client = SpotifyClient::new(session.clone());
        Self {
            session,
            client,
            scheduler: RefreshScheduler::new(),
            host,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Plugin initialization: install the persisted token, if any, and
    /// start the refresh scheduler.
    pub async fn init(&self, settings: &HashMap<String, String>) {
        if let Some(raw) = settings.get(TOKEN_SETTING_KEY).filter(|s| !s.is_empty()) {
            match serde_json::from_str::<Token>(raw) {
                Ok(token) if !token.access_token.is_empty() => {
                    info!(expires = ?token.expires, "installed persisted token");
                    self.session.install_token(token);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "could not parse persisted token, ignoring"),
            }
        }
        self.scheduler
            .start(self.session.clone(), self.host.clone());
    }

    pub fn shutdown(&self) {
        self.scheduler.stop();
    }

    /// Map a query to its handler. Without a usable token every command
    /// routes to the authentication prompt; handler failures degrade to an
    /// empty list.
    pub async fn query(&self, query: &PluginQuery) -> Vec<ListItem> {
        if !self.session.token_is_usable() || query.command == "auth" {
            return self.auth_prompt();
        }

        let result = match query.command.as_str() {
            "devices" => self.list_devices(query).await,
            "next" => self.skip_to_next().await,
            "queue" => self.user_queue().await,
            "recent" => self.show_recent().await,
            "search" => self.show_search(query).await,
            "me" => self.me().await,
            _ => self.now_playing().await,
        };

        match result {
            Ok(items) => items,
            Err(e) => {
                error!(command = %query.command, error = %e, "query handler failed");
                vec![]
            }
        }
    }

    /// Execute an action command picked in the launcher. Failures are
    /// logged and swallowed; the launcher state is never poisoned by a
    /// failed vendor call.
    pub async fn perform(&self, command: &ActionCommand) {
        let result = match command {
            ActionCommand::Play { uri } => self.client.play(uri).await,
            ActionCommand::Pause => self.client.pause().await,
            ActionCommand::Resume => self.client.resume().await,
            ActionCommand::Next => self.client.skip_next().await,
            ActionCommand::Previous => self.client.skip_previous().await,
            ActionCommand::ActivateDevice { device_id, requery } => {
                self.activate_device(device_id, requery).await
            }
            ActionCommand::BeginAuth => {
                self.begin_auth();
                Ok(())
            }
        };
        if let Err(e) = result {
            error!(?command, error = %e, "action failed");
        }
    }

    async fn activate_device(&self, device_id: &str, requery: &str) -> Result<(), SpotiqError> {
        self.client.transfer_playback(device_id).await?;
        // give the transfer a moment before the list is rebuilt
        tokio::time::sleep(ACTIVATE_SETTLE).await;
        self.host.change_query(requery).await
    }

    fn begin_auth(&self) {
        let url = self.session.begin_authorization();
        if webbrowser::open(&url).is_err() {
            warn!("Could not open browser automatically. Please visit:\n{url}");
        }
    }

    /// Deep-link callback from the host, carrying the authorization code.
    pub async fn handle_deep_link(&self, link: &DeepLink) {
        if link.action != AUTH_DEEP_LINK_ACTION {
            info!(action = %link.action, params = ?link.extra, "unknown deep link received");
            return;
        }
        info!("auth deep link received");

        match self.session.complete_authorization(&link.code).await {
            Ok(token) => {
                persist_token(self.host.as_ref(), &token).await;
                if let Err(e) = self.host.show_app().await {
                    warn!(error = %e, "could not surface launcher window");
                }
                if let Err(e) = self.host.change_query(TRIGGER_RESET).await {
                    warn!(error = %e, "could not reset launcher query");
                }
            }
            // prior token state stays as it was
            Err(e) => error!(error = %e, "authorization could not be completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::api::NullHost;
    use chrono::{Duration as ChronoDuration, Utc};

    fn plugin() -> SpotifyPlugin {
        SpotifyPlugin::new(PluginConfig::default(), Arc::new(NullHost))
    }

    fn usable_token() -> Token {
        Token {
            access_token: "tok".into(),
            token_type: "Bearer".into(),
            scope: String::new(),
            expires_in: 3600,
            refresh_token: Some("ref".into()),
            expires: Some(Utc::now() + ChronoDuration::seconds(3600)),
        }
    }

    #[tokio::test]
    async fn query_without_token_returns_auth_prompt() {
        let plugin = plugin();
        for command in ["", "devices", "search", "nonsense"] {
            let items = plugin
                .query(&PluginQuery {
                    command: command.into(),
                    ..PluginQuery::default()
                })
                .await;
            assert_eq!(items.len(), 1, "command {command:?}");
            assert_eq!(items[0].title, "Authenticate");
        }
    }

    #[tokio::test]
    async fn auth_command_prompts_even_with_usable_token() {
        let plugin = plugin();
        plugin.session.install_token(usable_token());
        let items = plugin
            .query(&PluginQuery {
                command: "auth".into(),
                ..PluginQuery::default()
            })
            .await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Authenticate");
    }

    #[tokio::test]
    async fn expired_token_routes_to_auth_prompt() {
        let plugin = plugin();
        let mut token = usable_token();
        token.expires = Some(Utc::now() + ChronoDuration::seconds(60));
        plugin.session.install_token(token);
        let items = plugin.query(&PluginQuery::default()).await;
        assert_eq!(items[0].title, "Authenticate");
    }

    #[tokio::test]
    async fn init_ignores_unparseable_and_empty_settings() {
        let plugin = plugin();

        let mut settings = HashMap::new();
        settings.insert(TOKEN_SETTING_KEY.to_string(), String::new());
        plugin.init(&settings).await;
        assert!(!plugin.session.token_is_usable());

        settings.insert(TOKEN_SETTING_KEY.to_string(), "not json".to_string());
        plugin.init(&settings).await;
        assert!(!plugin.session.token_is_usable());

        settings.insert(
            TOKEN_SETTING_KEY.to_string(),
            r#"{"access_token":""}"#.to_string(),
        );
        plugin.init(&settings).await;
        assert!(!plugin.session.token_is_usable());

        plugin.shutdown();
    }

    #[tokio::test]
    async fn init_installs_persisted_token_and_starts_scheduler() {
        let plugin = plugin();
        let mut settings = HashMap::new();
        settings.insert(
            TOKEN_SETTING_KEY.to_string(),
            serde_json::to_string(&usable_token()).unwrap(),
        );
        plugin.init(&settings).await;
        assert!(plugin.session.token_is_usable());
        assert_eq!(plugin.scheduler.active_tasks(), 1);

        // init is idempotent with respect to timers
        plugin.init(&settings).await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(plugin.scheduler.active_tasks(), 1);

        plugin.shutdown();
    }

    #[tokio::test]
    async fn unknown_deep_link_leaves_session_untouched() {
        let plugin = plugin();
        plugin
            .handle_deep_link(&DeepLink {
                action: "something-else".into(),
                code: "abc".into(),
                extra: HashMap::new(),
            })
            .await;
        assert!(plugin.session.current_token().is_none());
    }

    #[tokio::test]
    async fn auth_deep_link_without_code_is_rejected() {
        let plugin = plugin();
        plugin.session.begin_authorization();
        plugin
            .handle_deep_link(&DeepLink {
                action: AUTH_DEEP_LINK_ACTION.into(),
                code: String::new(),
                extra: HashMap::new(),
            })
            .await;
        assert!(plugin.session.current_token().is_none());
    }
}
