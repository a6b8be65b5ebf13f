pub mod auth;
pub mod config;
pub mod error;
pub mod host;
pub mod plugin;
pub mod spotify;

pub use auth::{RefreshScheduler, Session, Token};
pub use config::{PluginConfig, TOKEN_SETTING_KEY};
pub use error::SpotiqError;
pub use host::{ActionCommand, HostHandle, ListItem, PluginQuery};
pub use plugin::SpotifyPlugin;
pub use spotify::SpotifyClient;
