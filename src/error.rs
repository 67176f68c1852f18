// Error handling module
// Defines the typed failure taxonomy for configuration, token exchange and API calls

use thiserror::Error;

/// Configuration errors raised at client construction, before any network call.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required option is missing or empty
    #[error("missing configuration option: {0}")]
    Missing(&'static str),

    /// An option is present but unusable
    #[error("invalid configuration option {option}: {reason}")]
    Invalid {
        option: &'static str,
        reason: String,
    },
}

/// Failures of the OAuth2 client-credentials exchange.
///
/// The exchange is never retried at this layer; retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token endpoint rejected the exchange (4xx, or any unexpected status)
    #[error("token exchange rejected: {status} - {body}")]
    InvalidCredentials { status: u16, body: String },

    /// Connection-level failure (DNS, timeout, refused) before any HTTP status
    #[error("token endpoint unreachable")]
    ConnectionFailed(#[source] reqwest::Error),

    /// The token endpoint returned 2xx but the payload did not decode
    #[error("malformed token response")]
    Decode(#[source] DecodeError),
}

/// Failures of authenticated API calls.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Obtaining a valid access token failed; the request was never issued
    #[error("could not authenticate request")]
    Unauthenticated(#[source] AuthError),

    /// 4xx response (including a 401 that survived the single re-auth retry)
    #[error("API client error: {status} - {body}")]
    ClientError { status: u16, body: String },

    /// 5xx response, surfaced as-is with no automatic retry
    #[error("API server error: {status} - {body}")]
    ServerError { status: u16, body: String },

    /// The transport gave up following redirects
    #[error("too many redirects")]
    TooManyRedirects(#[source] reqwest::Error),

    /// Any other transport-level failure
    #[error("transport error")]
    Transport(#[source] reqwest::Error),

    /// A response body that failed to decode as JSON
    #[error("malformed response body")]
    Decode(#[source] DecodeError),
}

impl ApiError {
    /// HTTP status carried by this error, when one applies.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ClientError { status, .. } | ApiError::ServerError { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// A JSON payload that did not match the expected shape.
#[derive(Error, Debug)]
#[error("failed to decode response body")]
pub struct DecodeError(#[from] pub serde_json::Error);
