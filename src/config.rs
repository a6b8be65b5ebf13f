use std::env;

/// Host settings key under which the serialized token is persisted.
pub const TOKEN_SETTING_KEY: &str = "access_token";

const DEFAULT_CLIENT_ID: &str = "8a7e672e219e43fa8d0d73edbfc3d5ab";
const DEFAULT_REDIRECT_URI: &str = "launcher://plugin/spotiq?action=spotify-auth";
const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Scopes for every endpoint the query handlers and actions touch.
const SCOPES: &[&str] = &[
    "user-read-private",
    "user-read-email",
    "user-read-playback-state",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "user-read-recently-played",
    "user-library-read",
    "user-follow-read",
    "playlist-read-private",
];

/// Plugin configuration. Fixed application defaults, overridable through
/// `SPOTIQ_*` environment variables. The base URLs exist as overrides so
/// tests can stand up mock hosts.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub accounts_url: String,
    pub api_url: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: SCOPES.join(" "),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl PluginConfig {
    /// Build the configuration from the environment, falling back to the
    /// compiled-in defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            client_id: env::var("SPOTIQ_CLIENT_ID").unwrap_or(defaults.client_id),
            redirect_uri: env::var("SPOTIQ_REDIRECT_URI").unwrap_or(defaults.redirect_uri),
            scope: defaults.scope,
            accounts_url: env::var("SPOTIQ_ACCOUNTS_URL").unwrap_or(defaults.accounts_url),
            api_url: env::var("SPOTIQ_API_URL").unwrap_or(defaults.api_url),
        }
    }

    pub fn authorize_endpoint(&self) -> String {
        format!("{}/authorize", self.accounts_url)
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/api/token", self.accounts_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_spotify() {
        let cfg = PluginConfig::default();
        assert_eq!(cfg.accounts_url, "https://accounts.spotify.com");
        assert_eq!(cfg.api_url, "https://api.spotify.com/v1");
        assert!(!cfg.client_id.is_empty());
    }

    #[test]
    fn scope_is_space_separated() {
        let cfg = PluginConfig::default();
        assert!(cfg.scope.contains("user-modify-playback-state"));
        assert!(cfg.scope.contains(' '));
        assert!(!cfg.scope.contains(','));
    }

    #[test]
    fn endpoints_join_base_url() {
        let cfg = PluginConfig {
            accounts_url: "http://127.0.0.1:9999".into(),
            ..PluginConfig::default()
        };
        assert_eq!(cfg.authorize_endpoint(), "http://127.0.0.1:9999/authorize");
        assert_eq!(cfg.token_endpoint(), "http://127.0.0.1:9999/api/token");
    }
}
