//! Token lifecycle against a mock accounts service: code exchange,
//! scheduled refresh, and the no-op paths that must never hit the network.

mod common;

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::test_config;
use spotiq::auth::{RefreshOutcome, Session, Token};
use spotiq::PluginConfig;

fn token_expiring_in(secs: i64) -> Token {
    Token {
        access_token: "old-access".into(),
        token_type: "Bearer".into(),
        scope: String::new(),
        expires_in: secs,
        refresh_token: Some("old-refresh".into()),
        expires: Some(Utc::now() + Duration::seconds(secs)),
    }
}

async fn accounts_only_config() -> (MockServer, PluginConfig) {
    let accounts = MockServer::start().await;
    let api = MockServer::start().await;
    let config = test_config(&accounts, &api);
    (accounts, config)
}

#[tokio::test]
async fn code_exchange_installs_token() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("code_verifier="))
        .and(body_string_contains("client_id="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "scope": "user-read-private",
            "expires_in": 3600,
            "refresh_token": "fresh-refresh",
        })))
        .expect(1)
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    session.begin_authorization();
    let token = session.complete_authorization("the-code").await.unwrap();

    assert_eq!(token.access_token, "fresh-access");
    assert!(token.expires.is_some());
    assert!(session.token_is_usable());
    assert_eq!(session.bearer_token().as_deref(), Some("fresh-access"));
}

#[tokio::test]
async fn failed_exchange_leaves_prior_token() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": "invalid_grant", "error_description": "bad code"})),
        )
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    session.install_token(token_expiring_in(3600));
    session.begin_authorization();

    let err = session.complete_authorization("stale-code").await.unwrap_err();
    assert!(err.to_string().contains("invalid_grant"));
    assert_eq!(session.bearer_token().as_deref(), Some("old-access"));
}

#[tokio::test]
async fn verifier_is_consumed_by_the_exchange() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    session.begin_authorization();
    session.complete_authorization("the-code").await.unwrap();

    // second delivery of the same deep link has nothing to exchange with
    let err = session.complete_authorization("the-code").await.unwrap_err();
    assert!(err.to_string().contains("No authorization attempt pending"));
}

#[tokio::test]
async fn refresh_without_token_makes_no_network_call() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    let outcome = session.refresh_if_due().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::NotDue));
}

#[tokio::test]
async fn refresh_far_from_expiry_makes_no_network_call() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    session.install_token(token_expiring_in(3600));
    let outcome = session.refresh_if_due().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::NotDue));
}

#[tokio::test]
async fn refresh_without_expiry_makes_no_network_call() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    let mut token = token_expiring_in(60);
    token.expires = None;
    session.install_token(token);
    let outcome = session.refresh_if_due().await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::NotDue));
}

#[tokio::test]
async fn refresh_inside_margin_renews_and_retains_refresh_token() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            // Spotify omits refresh_token on refresh responses
            "access_token": "renewed-access",
            "token_type": "Bearer",
            "expires_in": 3600,
        })))
        .expect(1)
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    session.install_token(token_expiring_in(60));

    let outcome = session.refresh_if_due().await.unwrap();
    let renewed = match outcome {
        RefreshOutcome::Refreshed(token) => token,
        other => panic!("expected refresh, got {other:?}"),
    };
    assert_eq!(renewed.access_token, "renewed-access");
    assert_eq!(renewed.refresh_token.as_deref(), Some("old-refresh"));

    let installed = session.current_token().unwrap();
    assert_eq!(installed.access_token, "renewed-access");
    let remaining = installed.expires.unwrap() - Utc::now();
    assert!(remaining > Duration::seconds(3000));
}

#[tokio::test]
async fn failed_refresh_retains_previous_token() {
    let (accounts, config) = accounts_only_config().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&accounts)
        .await;

    let session = Session::new(config);
    session.install_token(token_expiring_in(60));

    let err = session.refresh_if_due().await.unwrap_err();
    assert!(err.to_string().contains("503"));
    assert_eq!(session.bearer_token().as_deref(), Some("old-access"));
}
