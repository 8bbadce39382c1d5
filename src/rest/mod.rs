// ABOUTME: REST accessors for the Lavalink v3 HTTP API
// ABOUTME: Authenticated GETs with typed decoding and node error payloads

/// Authenticated HTTP client
pub mod client;
/// Node error payload
pub mod error;

pub use client::RestClient;
pub use error::LavalinkError;
