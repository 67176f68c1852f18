// Authentication module
// Manages the OAuth2 client-credentials token lifecycle

mod exchange;
mod manager;
mod types;

pub use manager::TokenManager;
pub use types::Token;
