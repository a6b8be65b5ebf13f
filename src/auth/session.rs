use std::sync::{Mutex, RwLock};

use tracing::{debug, info};

use crate::auth::pkce::generate_pkce;
use crate::auth::token::{exchange_code, refresh_grant, Token};
use crate::config::PluginConfig;
use crate::error::SpotiqError;

/// Outcome of a scheduler-driven refresh check.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Nothing to do: no token, no expiry, no refresh token, or not yet
    /// inside the expiry margin.
    NotDue,
    /// The token was renewed and installed; the new token is returned so
    /// the caller can persist it.
    Refreshed(Token),
}

/// Process-wide authentication state, owned by the plugin instance and
/// shared by reference with the handlers and the refresh scheduler.
///
/// Locks are held only to read or swap the state, never across an await;
/// callers work on snapshots.
pub struct Session {
    config: PluginConfig,
    http: reqwest::Client,
    token: RwLock<Option<Token>>,
    pending_verifier: Mutex<Option<String>>,
}

impl Session {
    pub fn new(config: PluginConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            token: RwLock::new(None),
            pending_verifier: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Shared HTTP client (cheap handle clone).
    pub fn http_client(&self) -> reqwest::Client {
        self.http.clone()
    }

    /// The validity predicate, re-derived on every query.
    pub fn token_is_usable(&self) -> bool {
        self.token
            .read()
            .expect("token lock poisoned")
            .as_ref()
            .map(Token::is_usable)
            .unwrap_or(false)
    }

    /// Snapshot of the current access token, usable or not. Player calls
    /// racing a refresh get whichever token is installed at snapshot time.
    pub fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .expect("token lock poisoned")
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn current_token(&self) -> Option<Token> {
        self.token.read().expect("token lock poisoned").clone()
    }

    /// Install a token obtained from persistence or a code exchange.
    pub fn install_token(&self, token: Token) {
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    /// Install a token from a refresh grant, retaining the previous
    /// refresh token when the response omitted one.
    pub fn install_refreshed(&self, mut token: Token) -> Token {
        let mut guard = self.token.write().expect("token lock poisoned");
        if token.refresh_token.is_none() {
            token.refresh_token = guard.as_ref().and_then(|t| t.refresh_token.clone());
        }
        *guard = Some(token.clone());
        token
    }

    /// Start a PKCE authorization attempt: remember a fresh verifier and
    /// return the URL to open in the browser. A second call replaces any
    /// pending verifier.
    pub fn begin_authorization(&self) -> String {
        let pkce = generate_pkce();
        let url = format!(
            "{}?response_type=code&client_id={}&scope={}&code_challenge_method=S256&code_challenge={}&redirect_uri={}",
            self.config.authorize_endpoint(),
            urlencoded(&self.config.client_id),
            urlencoded(&self.config.scope),
            pkce.code_challenge,
            urlencoded(&self.config.redirect_uri),
        );
        *self
            .pending_verifier
            .lock()
            .expect("verifier lock poisoned") = Some(pkce.code_verifier);
        url
    }

    /// Complete the authorization started by [`begin_authorization`],
    /// consuming the stored verifier. On success the token is installed
    /// and returned for persistence; on failure prior token state is left
    /// unchanged.
    pub async fn complete_authorization(&self, code: &str) -> Result<Token, SpotiqError> {
        if code.is_empty() {
            return Err(SpotiqError::OAuth(
                "Empty authorization code in deep link".into(),
            ));
        }
        let verifier = self
            .pending_verifier
            .lock()
            .expect("verifier lock poisoned")
            .take()
            .ok_or_else(|| {
                SpotiqError::OAuth(
                    "No authorization attempt pending (restarted mid-flow?)".into(),
                )
            })?;

        let token = exchange_code(
            &self.http,
            &self.config.token_endpoint(),
            code,
            &verifier,
            &self.config.redirect_uri,
            &self.config.client_id,
        )
        .await?;

        info!("authorization code exchanged, token installed");
        self.install_token(token.clone());
        Ok(token)
    }

    /// The refresh check the scheduler runs every tick. Performs a network
    /// call only when a token with an expiry inside the margin and a
    /// refresh token is held.
    pub async fn refresh_if_due(&self) -> Result<RefreshOutcome, SpotiqError> {
        let snapshot = match self.current_token() {
            Some(t) => t,
            None => return Ok(RefreshOutcome::NotDue),
        };
        if !snapshot.refresh_due() {
            return Ok(RefreshOutcome::NotDue);
        }
        let refresh_tok = match snapshot.refresh_token {
            Some(t) => t,
            None => {
                debug!("token near expiry but no refresh token held");
                return Ok(RefreshOutcome::NotDue);
            }
        };

        let renewed = refresh_grant(
            &self.http,
            &self.config.token_endpoint(),
            &refresh_tok,
            &self.config.client_id,
        )
        .await?;

        let installed = self.install_refreshed(renewed);
        info!(expires = ?installed.expires, "access token refreshed");
        Ok(RefreshOutcome::Refreshed(installed))
    }
}

fn urlencoded(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 2);
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(b as char);
            }
            _ => {
                result.push('%');
                result.push_str(&format!("{b:02X}"));
            }
        }
    }
    result
}
