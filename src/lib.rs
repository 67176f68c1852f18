// SlimPay client SDK - library root

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http_client;
pub mod response;

pub use auth::{Token, TokenManager};
pub use client::SlimPay;
pub use config::{CheckoutMode, ClientConfig};
pub use error::{ApiError, AuthError, ConfigError, DecodeError};
pub use http_client::{ApiClient, RequestOptions};
pub use response::ApiResponse;

// Callers build requests against this
pub use reqwest::Method;
