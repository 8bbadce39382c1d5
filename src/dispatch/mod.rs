// ABOUTME: Event dispatch for the Lavalink WebSocket feed
// ABOUTME: Listener registry plus the background loop that reads and routes frames

/// Background task reading WebSocket frames
pub(crate) mod frame_loop;
/// Event-type keyed listener lists with fire-and-forget fan-out
pub mod registry;

pub use registry::{ListenerError, ListenerRegistry};

/// Lifecycle of the frame loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Frames are being read and dispatched
    Open,
    /// The socket was closed by either side
    Closed,
    /// The loop stopped on a socket error or protocol violation
    Errored(String),
}

impl ConnectionStatus {
    /// True once the loop has stopped for good
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}
