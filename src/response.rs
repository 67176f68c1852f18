// Normalized API response wrapper

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, DecodeError};

/// A normalized response, owned by the caller once returned.
///
/// Status and headers are captured eagerly; the body is kept as raw text and
/// decoded on demand, so callers that only inspect the status pay no parsing
/// cost and malformed payloads surface as a typed [`DecodeError`] instead of a
/// partially-populated object.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl ApiResponse {
    /// Drain a raw transport response into an owned wrapper.
    pub(crate) async fn from_raw(response: reqwest::Response) -> Result<Self, ApiError> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ApiError::Transport)?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Decode the body as an untyped JSON document.
    pub fn to_value(&self) -> Result<Value, DecodeError> {
        serde_json::from_str(&self.body).map_err(DecodeError)
    }

    /// Decode the body into a caller-supplied type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, DecodeError> {
        serde_json::from_str(&self.body).map_err(DecodeError)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}
