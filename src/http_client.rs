use reqwest::{Client, Method};
use serde_json::Value;

use crate::auth::TokenManager;
use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};
use crate::response::ApiResponse;

/// User-Agent sent on every call, token exchanges included.
pub(crate) const USER_AGENT: &str = concat!(
    "LunaLabs SlimPay Rust ",
    env!("CARGO_PKG_VERSION"),
    " Client"
);

/// Caller-supplied request options.
///
/// Only a JSON body and query parameters are recognized; auth and content
/// headers are owned by the client and cannot be overridden.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON request body
    pub json: Option<Value>,

    /// Query parameters appended to the URL
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Options carrying only a JSON body.
    pub fn json(body: Value) -> Self {
        Self {
            json: Some(body),
            ..Self::default()
        }
    }

    /// Options carrying only query parameters.
    pub fn query(params: Vec<(String, String)>) -> Self {
        Self {
            query: params,
            ..Self::default()
        }
    }
}

/// HTTP client for the HAL/JSON API with single-retry re-authentication.
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Immutable client configuration
    config: ClientConfig,

    /// Token manager
    token_manager: TokenManager,
}

impl ApiClient {
    /// Create a new client. Fails fast on invalid configuration, before any
    /// network call.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid {
                option: "transport",
                reason: e.to_string(),
            })?;

        let token_manager = TokenManager::new(client.clone(), config.clone());

        Ok(Self {
            client,
            config,
            token_manager,
        })
    }

    /// The client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token manager, exposed for direct token inspection.
    pub fn token_manager(&self) -> &TokenManager {
        &self.token_manager
    }

    /// Perform an authenticated API request.
    ///
    /// `path` is joined onto the configured base URI; absolute URLs are used
    /// as-is, since HAL documents link to resources by absolute href.
    ///
    /// On a 401 the cached token is invalidated and the request retried with a
    /// fresh token exactly once; whatever the second attempt yields is final.
    /// All other failures map to a typed [`ApiError`] without retry.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.endpoint_url(path);
        let mut retried = false;

        tracing::debug!(method = %method, url = %url, "Sending API request");

        // Bounded loop: at most one extra attempt, driven by the 401 branch.
        loop {
            let token = self
                .token_manager
                .get_token()
                .await
                .map_err(ApiError::Unauthenticated)?;

            let mut builder = self
                .client
                .request(method.clone(), &url)
                .header("User-Agent", USER_AGENT)
                .header(
                    "Accept",
                    format!(
                        "application/hal+json; profile=\"{}/alps/{}\"",
                        self.config.profile_uri, self.config.api_version
                    ),
                )
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", token.access_token));

            if !options.query.is_empty() {
                builder = builder.query(&options.query);
            }
            if let Some(ref body) = options.json {
                builder = builder.json(body);
            }

            match builder.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        tracing::debug!(status = %status, "Request successful");
                        return ApiResponse::from_raw(response).await;
                    }

                    // A 401 means the server no longer accepts the token even
                    // if it looks unexpired from here (clock skew, revocation).
                    if status.as_u16() == 401 && !retried {
                        tracing::warn!("Received 401, invalidating token and retrying once");
                        self.token_manager.invalidate().await;
                        retried = true;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    tracing::warn!(
                        status = status.as_u16(),
                        body = %body,
                        "Request failed"
                    );

                    return Err(if status.is_server_error() {
                        ApiError::ServerError {
                            status: status.as_u16(),
                            body,
                        }
                    } else {
                        ApiError::ClientError {
                            status: status.as_u16(),
                            body,
                        }
                    });
                }

                Err(e) => {
                    tracing::warn!(error = %e, url = %url, "Transport error");

                    return Err(if e.is_redirect() {
                        ApiError::TooManyRedirects(e)
                    } else {
                        ApiError::Transport(e)
                    });
                }
            }
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_uri.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    }
}
