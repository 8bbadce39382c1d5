// ABOUTME: Session lifecycle for a single Lavalink node
// ABOUTME: Configuration, owned connection state, and the public client

/// Lavalink client: connect, listen, REST accessors
pub mod client;
/// Connection parameters, URLs, and headers
pub mod config;
mod state;

pub use client::Lavalink;
pub use config::ConnectionConfig;
pub use state::SocketHandle;
