// ABOUTME: Main library entry point for lava
// ABOUTME: Exports public API for the Lavalink node client

//! # lava
//!
//! Async client for Lavalink audio nodes.
//!
//! A [`Lavalink`] client holds one authenticated session against a node: a long-lived
//! WebSocket feed whose frames are decoded into typed [`Event`]s and fanned out to registered
//! listeners, plus a thin REST accessor layer sharing the same credentials.

#![warn(missing_docs)]

/// Listener registry and the background frame loop
pub mod dispatch;
/// Session configuration, state, and lifecycle
pub mod node;
/// Wire decoding for events and payload models
pub mod protocol;
/// REST accessors for the node's versioned HTTP API
pub mod rest;

pub use dispatch::{ConnectionStatus, ListenerError, ListenerRegistry};
pub use node::{ConnectionConfig, Lavalink};
pub use protocol::events::{Event, EventKind, EventType};
pub use protocol::models::Player;
pub use protocol::payload::FromPayload;
pub use rest::{LavalinkError, RestClient};

/// Result type for lava operations
pub type Result<T> = std::result::Result<T, error::Error>;

/// Error types for lava
pub mod error {
    use crate::rest::LavalinkError;
    use thiserror::Error;

    /// Error types for lava operations
    #[derive(Error, Debug)]
    pub enum Error {
        /// A session accessor was used before `connect()` or after `close()`
        #[error("Lavalink::connect() was not called")]
        NotConnected,

        /// WebSocket handshake failed
        #[error("Connection error: {0}")]
        Connection(String),

        /// WebSocket read or write failed
        #[error("WebSocket error: {0}")]
        WebSocket(String),

        /// Protocol violation or payload parsing error
        #[error("Protocol error: {0}")]
        Protocol(String),

        /// HTTP transport failure or unrecognised error response
        #[error("HTTP error: {0}")]
        Http(String),

        /// The node answered a REST call with an error payload
        #[error(transparent)]
        Api(#[from] LavalinkError),

        /// A configured value cannot be sent as an HTTP header
        #[error("Invalid value for header {0}")]
        InvalidHeader(&'static str),
    }
}
