// High-level façade over the authenticated API client

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Method;
use serde_json::Value;

use crate::config::{CheckoutMode, ClientConfig};
use crate::error::{ApiError, ConfigError, DecodeError};
use crate::http_client::{ApiClient, RequestOptions};

/// Thin convenience layer for common checkout and resource operations.
///
/// Everything here delegates to [`ApiClient::request`]; no additional state or
/// retry policy lives at this level.
pub struct SlimPay {
    api: ApiClient,
}

impl SlimPay {
    /// Create a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiClient::new(config)?,
        })
    }

    /// Create a client from `SLIMPAY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// The underlying request client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Send a checkout order. The response is a HAL document referencing the
    /// approval page and related resources.
    pub async fn checkout(&self, data: Value) -> Result<Value, ApiError> {
        let response = self
            .api
            .request(Method::POST, "/orders", RequestOptions::json(data))
            .await?;
        response.to_value().map_err(ApiError::Decode)
    }

    /// Fetch an arbitrary authenticated resource.
    pub async fn get_resource(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let response = self.api.request(Method::GET, endpoint, options).await?;
        response.to_value().map_err(ApiError::Decode)
    }

    /// Fetch a payment by reference.
    pub async fn get_payment(&self, payment: &str) -> Result<Value, ApiError> {
        let endpoint = format!("/payments/{}", payment);
        self.get_resource(&endpoint, RequestOptions::default()).await
    }

    /// Whether a response looks like a HAL document.
    pub fn is_valid_response(response: &Value) -> bool {
        response.get("_links").is_some()
    }

    /// Resolve the checkout approval content from an order response.
    ///
    /// In `Redirect` mode this is the hosted approval page URL for the caller
    /// to redirect to. In `Iframe` mode the extended approval link is followed
    /// (with its `{?mode}` template stripped and `mode=iframeembedded` set)
    /// and the base64 `content` field decoded into embeddable HTML.
    pub async fn checkout_link(&self, response: &Value) -> Result<String, ApiError> {
        let config = self.api.config();

        match config.mode {
            CheckoutMode::Redirect => {
                let relation = format!("{}/alps#user-approval", config.profile_uri);
                let href = link_href(response, &relation)
                    .ok_or_else(|| malformed(format!("missing link relation {}", relation)))?;
                Ok(href.to_string())
            }

            CheckoutMode::Iframe => {
                let relation = format!("{}/alps#extended-user-approval", config.profile_uri);
                let href = link_href(response, &relation)
                    .ok_or_else(|| malformed(format!("missing link relation {}", relation)))?;

                let href = href.replace("{?mode}", "");
                let encoded = self
                    .get_resource(
                        &href,
                        RequestOptions::query(vec![(
                            "mode".to_string(),
                            "iframeembedded".to_string(),
                        )]),
                    )
                    .await?;

                let content = encoded
                    .get("content")
                    .and_then(Value::as_str)
                    .ok_or_else(|| malformed("iframe resource has no content field"))?;

                let html = BASE64
                    .decode(content)
                    .map_err(|e| malformed(format!("iframe content is not base64: {}", e)))?;

                String::from_utf8(html)
                    .map_err(|e| malformed(format!("iframe content is not UTF-8: {}", e)))
            }
        }
    }
}

/// Extract an href from a HAL `_links` member by relation name.
fn link_href<'a>(response: &'a Value, relation: &str) -> Option<&'a str> {
    response
        .get("_links")?
        .get(relation)?
        .get("href")?
        .as_str()
}

fn malformed(message: impl std::fmt::Display) -> ApiError {
    use serde::de::Error as _;
    ApiError::Decode(DecodeError(serde_json::Error::custom(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_valid_response() {
        assert!(SlimPay::is_valid_response(
            &json!({"_links": {"self": {"href": "/orders/1"}}})
        ));
        assert!(!SlimPay::is_valid_response(&json!({"reference": "x"})));
    }

    #[test]
    fn test_link_href_lookup() {
        let doc = json!({
            "_links": {
                "https://api.slimpay.net/alps#user-approval": {
                    "href": "https://checkout.slimpay.com/approve/abc"
                }
            }
        });

        assert_eq!(
            link_href(&doc, "https://api.slimpay.net/alps#user-approval"),
            Some("https://checkout.slimpay.com/approve/abc")
        );
        assert_eq!(link_href(&doc, "https://api.slimpay.net/alps#other"), None);
        assert_eq!(link_href(&json!({}), "anything"), None);
    }
}
