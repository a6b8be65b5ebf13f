#[derive(Debug, thiserror::Error)]
pub enum SpotiqError {
    #[error("Not authenticated with Spotify. Run the auth command from the launcher.")]
    AuthRequired,

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Spotify API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No Spotify playback device available")]
    NoDevice,

    #[error("Unsupported Spotify URI: {0}")]
    UnsupportedUri(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpotiqError {
    /// Error code string carried in JSON-RPC error data.
    pub fn code(&self) -> &'static str {
        match self {
            SpotiqError::AuthRequired => "auth_required",
            SpotiqError::OAuth(_) => "oauth_error",
            SpotiqError::Api { .. } => "api_error",
            SpotiqError::NoDevice => "no_device",
            SpotiqError::UnsupportedUri(_) => "unsupported_uri",
            SpotiqError::Protocol(_) => "parse_error",
            SpotiqError::Settings(_) => "settings_error",
            SpotiqError::Http(_) => "http_error",
            SpotiqError::Io(_) => "io_error",
        }
    }

    /// HTTP status of the underlying vendor response, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SpotiqError::Api { status, .. } => Some(*status),
            SpotiqError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
