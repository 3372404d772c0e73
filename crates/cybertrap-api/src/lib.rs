// cybertrap-api: Async Rust client for the CyberTrap scan-management backend

pub mod auth;
pub mod client;
pub mod error;
pub mod session;
pub mod transport;
pub mod types;

pub use auth::{OAuthSettings, TokenResponse};
pub use client::ApiClient;
pub use error::{Error, ErrorCategory};
pub use session::Session;
pub use transport::TransportConfig;
