// Client-credentials exchange against the token endpoint

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use reqwest::Client;

use super::types::{Token, TokenResponse};
use crate::config::ClientConfig;
use crate::error::{AuthError, DecodeError};
use crate::http_client::USER_AGENT;

/// Perform one `client_credentials` exchange.
///
/// `POST {base_uri}/oauth/token` with Basic auth built from the app id and
/// secret. The returned token is stamped with the local clock, not the
/// server's, so expiry checks stay consistent under clock skew. Never retried
/// here.
pub async fn exchange(client: &Client, config: &ClientConfig) -> Result<Token, AuthError> {
    let url = format!("{}/oauth/token", config.base_uri.trim_end_matches('/'));
    let credentials = BASE64.encode(format!("{}:{}", config.app_id, config.app_secret));

    tracing::debug!(url = %url, "Requesting access token");

    let response = client
        .post(&url)
        .header("User-Agent", USER_AGENT)
        .header("Accept", "application/json")
        .header("Authorization", format!("Basic {}", credentials))
        .form(&[("grant_type", "client_credentials"), ("scope", "api")])
        .send()
        .await
        .map_err(AuthError::ConnectionFailed)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(
            status = status.as_u16(),
            body = %body,
            "Token exchange rejected"
        );
        return Err(AuthError::InvalidCredentials {
            status: status.as_u16(),
            body,
        });
    }

    // Stamp receipt time before decoding so the validity window starts at the
    // moment the token arrived.
    let created_at = Utc::now();

    let body = response.text().await.map_err(AuthError::ConnectionFailed)?;
    let data: TokenResponse =
        serde_json::from_str(&body).map_err(|e| AuthError::Decode(DecodeError(e)))?;

    tracing::debug!(expires_in = data.expires_in, "Access token obtained");

    Ok(Token::new(data.access_token, data.expires_in, created_at))
}
