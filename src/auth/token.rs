use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SpotiqError;

/// How close to expiry a token is still considered usable. The refresh
/// scheduler renews inside the same margin.
pub const EXPIRY_MARGIN_SECS: i64 = 300;

/// An OAuth token pair as persisted in the host settings store. `expires`
/// is computed from `expires_in` when the grant response lands; the raw
/// `expires_in` is kept so the serialized form round-trips.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

impl Token {
    /// A token is usable when it carries an access token and its expiry,
    /// if known, is more than the margin away.
    pub fn is_usable(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires {
            Some(expires) => expires - Utc::now() > Duration::seconds(EXPIRY_MARGIN_SECS),
            None => true,
        }
    }

    /// Whether the refresh scheduler should renew now: only tokens that
    /// carry an expiry are ever refreshed, and only inside the margin.
    pub fn refresh_due(&self) -> bool {
        match self.expires {
            Some(expires) => expires - Utc::now() <= Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }
}

/// Raw token response from the accounts service.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Token {
        let expires = self
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));
        Token {
            access_token: self.access_token,
            token_type: self.token_type,
            scope: self.scope,
            expires_in: self.expires_in.unwrap_or(0),
            refresh_token: self.refresh_token,
            expires,
        }
    }
}

/// Exchange an authorization code (plus the PKCE verifier it was issued
/// against) for a token.
pub async fn exchange_code(
    http: &reqwest::Client,
    token_endpoint: &str,
    code: &str,
    code_verifier: &str,
    redirect_uri: &str,
    client_id: &str,
) -> Result<Token, SpotiqError> {
    let resp = http
        .post(token_endpoint)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", code_verifier),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
        ])
        .send()
        .await
        .map_err(|e| SpotiqError::OAuth(format!("Token exchange request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(SpotiqError::OAuth(format!(
            "Token exchange failed with status {status}: {body}"
        )));
    }

    let token_resp: TokenResponse = resp
        .json()
        .await
        .map_err(|e| SpotiqError::OAuth(format!("Failed to parse token response: {e}")))?;

    Ok(token_resp.into_token())
}

/// Renew via the refresh-token grant. The response may omit
/// `refresh_token`; the caller decides whether to retain the previous one.
pub async fn refresh_grant(
    http: &reqwest::Client,
    token_endpoint: &str,
    refresh_tok: &str,
    client_id: &str,
) -> Result<Token, SpotiqError> {
    let resp = http
        .post(token_endpoint)
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_tok),
            ("client_id", client_id),
        ])
        .send()
        .await
        .map_err(|e| SpotiqError::OAuth(format!("Token refresh request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(SpotiqError::OAuth(format!(
            "Token refresh failed with status {status}: {body}"
        )));
    }

    let token_resp: TokenResponse = resp
        .json()
        .await
        .map_err(|e| SpotiqError::OAuth(format!("Failed to parse refresh response: {e}")))?;

    Ok(token_resp.into_token())
}
