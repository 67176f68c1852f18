use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use super::exchange;
use super::types::Token;
use crate::config::ClientConfig;
use crate::error::AuthError;

/// Token manager
/// Owns the cached access token and drives the credential exchange.
///
/// The cache lives behind a mutex that is held across the exchange, so
/// concurrent callers cannot race to refresh or observe a token
/// mid-replacement. Tokens are replaced, never mutated, and never persisted.
pub struct TokenManager {
    /// Shared HTTP client
    client: Client,

    /// Immutable client configuration
    config: ClientConfig,

    /// Current token, if any
    token: Mutex<Option<Token>>,
}

impl TokenManager {
    /// Create a new TokenManager. The configuration is assumed validated.
    pub fn new(client: Client, config: ClientConfig) -> Self {
        Self {
            client,
            config,
            token: Mutex::new(None),
        }
    }

    /// Get a currently-valid access token, exchanging credentials if needed.
    ///
    /// A cached, unexpired token is returned without any network call. An
    /// expired entry is discarded and a fresh exchange performed. The exchange
    /// itself is never retried at this layer.
    pub async fn get_token(&self) -> Result<Token, AuthError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid(Utc::now()) {
                return Ok(token.clone());
            }
            tracing::debug!("Cached access token expired, discarding");
            *cached = None;
        }

        let token = exchange::exchange(&self.client, &self.config).await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Drop the cached token, forcing the next [`get_token`](Self::get_token)
    /// to exchange.
    ///
    /// Called by the request layer after a 401: the server may reject a token
    /// that still looks unexpired from this client's perspective (clock skew,
    /// server-side revocation).
    pub async fn invalidate(&self) {
        let mut cached = self.token.lock().await;
        if cached.take().is_some() {
            tracing::debug!("Access token invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_for(base_uri: &str) -> ClientConfig {
        ClientConfig::new(
            base_uri,
            "https://api.slimpay.net",
            "v1",
            "democreditor01",
            "demosecret01",
        )
    }

    async fn seed(manager: &TokenManager, token: Token) {
        let mut cached = manager.token.lock().await;
        *cached = Some(token);
    }

    #[tokio::test]
    async fn test_valid_cached_token_needs_no_network() {
        // Unroutable base URI: any exchange attempt would fail loudly
        let manager = TokenManager::new(Client::new(), config_for("http://127.0.0.1:1"));
        seed(&manager, Token::new("cached".to_string(), 3600, Utc::now())).await;

        let token = manager.get_token().await.unwrap();
        assert_eq!(token.access_token, "cached");
    }

    #[tokio::test]
    async fn test_expired_token_is_replaced() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": "fresh", "expires_in": 3600}).to_string())
            .expect(1)
            .create_async()
            .await;

        let manager = TokenManager::new(Client::new(), config_for(&server.url()));
        seed(
            &manager,
            Token::new(
                "stale".to_string(),
                3600,
                Utc::now() - chrono::Duration::seconds(7200),
            ),
        )
        .await;

        let token = manager.get_token().await.unwrap();
        assert_eq!(token.access_token, "fresh");

        // The replacement is cached: a second call performs no exchange
        let token = manager.get_token().await.unwrap();
        assert_eq!(token.access_token, "fresh");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_forces_exchange() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": "fresh", "expires_in": 3600}).to_string())
            .expect(1)
            .create_async()
            .await;

        let manager = TokenManager::new(Client::new(), config_for(&server.url()));
        seed(&manager, Token::new("cached".to_string(), 3600, Utc::now())).await;

        manager.invalidate().await;

        let token = manager.get_token().await.unwrap();
        assert_eq!(token.access_token, "fresh");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_sends_basic_auth_and_form_body() {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine;

        let expected_auth = format!(
            "Basic {}",
            BASE64.encode("democreditor01:demosecret01")
        );

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/oauth/token")
            .match_header("authorization", expected_auth.as_str())
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("grant_type=client_credentials&scope=api")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": "abc", "expires_in": 3600}).to_string())
            .create_async()
            .await;

        let manager = TokenManager::new(Client::new(), config_for(&server.url()));
        let token = manager.get_token().await.unwrap();

        assert_eq!(token.access_token, "abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_exchange_maps_to_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body("invalid_client")
            .create_async()
            .await;

        let manager = TokenManager::new(Client::new(), config_for(&server.url()));

        match manager.get_token().await {
            Err(AuthError::InvalidCredentials { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected InvalidCredentials, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_maps_to_connection_failed() {
        let manager = TokenManager::new(Client::new(), config_for("http://127.0.0.1:1"));

        match manager.get_token().await {
            Err(AuthError::ConnectionFailed(_)) => {}
            other => panic!("expected ConnectionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_token_payload_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": 42}"#)
            .create_async()
            .await;

        let manager = TokenManager::new(Client::new(), config_for(&server.url()));

        match manager.get_token().await {
            Err(AuthError::Decode(_)) => {}
            other => panic!("expected Decode, got {:?}", other),
        }
    }
}
