// ABOUTME: Protocol implementation for the Lavalink v3 wire format
// ABOUTME: Event decoding, payload models, and the FromPayload constructor

/// Discriminated decoding of WebSocket frames into typed events
pub mod events;
/// Payload models shared by events and REST responses
pub mod models;
/// Generic payload constructor
pub mod payload;
mod serde_helpers;

pub use events::{Event, EventKind, EventType};
pub use payload::FromPayload;
