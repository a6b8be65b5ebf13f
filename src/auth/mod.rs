pub mod pkce;
pub mod scheduler;
pub mod session;
pub mod token;

pub use pkce::{challenge_for, generate_pkce, PkceChallenge};
pub use scheduler::{RefreshScheduler, REFRESH_INTERVAL};
pub use session::{RefreshOutcome, Session};
pub use token::{exchange_code, refresh_grant, Token, EXPIRY_MARGIN_SECS};

use tracing::warn;

use crate::config::TOKEN_SETTING_KEY;
use crate::host::api::HostHandle;

/// Persist a token through the host settings store. Failures are logged;
/// the in-memory token is already installed either way.
pub async fn persist_token(host: &dyn HostHandle, token: &Token) {
    let json = match serde_json::to_string(token) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize token for persistence");
            return;
        }
    };
    if let Err(e) = host.store_setting(TOKEN_SETTING_KEY, &json).await {
        warn!(error = %e, "failed to persist token");
    }
}
