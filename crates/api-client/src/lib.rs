pub mod client;
pub mod error;

pub use agentdesk_api;
pub use client::ApiClient;
pub use error::ClientError;
