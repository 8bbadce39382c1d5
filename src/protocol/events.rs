// ABOUTME: Event type definitions and discriminated frame decoding
// ABOUTME: Routes on `op`, then on `type` for track and voice events

use super::models::{PlayerState, Stats, TrackEndReason, TrackException};
use super::serde_helpers::{duration_ms, snowflake};
use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// One decoded WebSocket frame
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// `op: ready`
    Ready(ReadyEvent),
    /// `op: playerUpdate`
    PlayerUpdate(PlayerUpdateEvent),
    /// `op: stats`
    Stats(StatsEvent),
    /// `TrackStartEvent`
    TrackStart(TrackStartEvent),
    /// `TrackEndEvent`
    TrackEnd(TrackEndEvent),
    /// `TrackExceptionEvent`
    TrackException(TrackExceptionEvent),
    /// `TrackStuckEvent`
    TrackStuck(TrackStuckEvent),
    /// `WebSocketClosedEvent`
    WebSocketClosed(WebSocketClosedEvent),
}

/// Field-less discriminant of [`Event`], used to key listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`ReadyEvent`]
    Ready,
    /// [`PlayerUpdateEvent`]
    PlayerUpdate,
    /// [`StatsEvent`]
    Stats,
    /// [`TrackStartEvent`]
    TrackStart,
    /// [`TrackEndEvent`]
    TrackEnd,
    /// [`TrackExceptionEvent`]
    TrackException,
    /// [`TrackStuckEvent`]
    TrackStuck,
    /// [`WebSocketClosedEvent`]
    WebSocketClosed,
}

/// Sent once the node has accepted the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyEvent {
    /// Whether a previous session was resumed via the resume key
    pub resumed: bool,
    /// Session id used in REST paths
    pub session_id: String,
}

/// Periodic playback position report for one guild
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdateEvent {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Reported player state
    pub state: PlayerState,
}

/// Periodic node statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsEvent(pub Stats);

impl std::ops::Deref for StatsEvent {
    type Target = Stats;

    fn deref(&self) -> &Stats {
        &self.0
    }
}

/// A track started playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStartEvent {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Base64 track the event concerns
    pub encoded_track: String,
}

/// A track stopped playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackEndEvent {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Base64 track the event concerns
    pub encoded_track: String,
    /// Why playback ended
    pub reason: TrackEndReason,
}

/// A track failed while loading or playing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackExceptionEvent {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Base64 track the event concerns
    pub encoded_track: String,
    /// What went wrong
    pub exception: TrackException,
}

/// A track produced no audio for longer than `threshold`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTrackStuckEvent")]
pub struct TrackStuckEvent {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Base64 track the event concerns
    pub encoded_track: String,
    /// How long the track was silent before the node gave up
    #[serde(rename = "thresholdMs", with = "duration_ms")]
    pub threshold: Duration,
}

// Nodes before 3.7 only send the deprecated `track` key, newer ones may send both.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrackStuckEvent {
    #[serde(with = "snowflake")]
    guild_id: u64,
    encoded_track: Option<String>,
    track: Option<Value>,
    #[serde(rename = "thresholdMs", with = "duration_ms")]
    threshold: Duration,
}

impl TryFrom<RawTrackStuckEvent> for TrackStuckEvent {
    type Error = String;

    fn try_from(raw: RawTrackStuckEvent) -> Result<Self, Self::Error> {
        let encoded_track = raw
            .encoded_track
            .or_else(|| raw.track.as_ref().and_then(Value::as_str).map(str::to_owned))
            .ok_or_else(|| "missing field `encodedTrack`".to_string())?;

        Ok(Self {
            guild_id: raw.guild_id,
            encoded_track,
            threshold: raw.threshold,
        })
    }
}

/// Discord closed the node's voice WebSocket for a guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebSocketClosedEvent {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Discord close code
    pub code: u16,
    /// Close reason sent by Discord
    pub reason: String,
    /// Whether Discord closed the connection
    pub by_remote: bool,
}

// Wire envelope. `op` selects the category, `type` the sub-event under `op: "event"`.
#[derive(Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
enum Frame {
    Ready(ReadyEvent),
    PlayerUpdate(PlayerUpdateEvent),
    Stats(StatsEvent),
    Event(EventFrame),
    #[serde(other)]
    Unknown,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum EventFrame {
    #[serde(rename = "TrackStartEvent")]
    TrackStart(TrackStartEvent),
    #[serde(rename = "TrackEndEvent")]
    TrackEnd(TrackEndEvent),
    #[serde(rename = "TrackExceptionEvent")]
    TrackException(TrackExceptionEvent),
    #[serde(rename = "TrackStuckEvent")]
    TrackStuck(TrackStuckEvent),
    #[serde(rename = "WebSocketClosedEvent")]
    WebSocketClosed(WebSocketClosedEvent),
    #[serde(other)]
    Unknown,
}

impl Event {
    /// Decode a text frame.
    ///
    /// Returns `Ok(None)` for frames whose `op` or `type` this client does not know.
    pub fn from_json(text: &str) -> Result<Option<Self>, Error> {
        let payload: Value = serde_json::from_str(text)
            .map_err(|e| Error::Protocol(format!("malformed frame: {e}")))?;
        Self::from_payload(&payload)
    }

    /// Decode an already-parsed frame object.
    pub fn from_payload(payload: &Value) -> Result<Option<Self>, Error> {
        let op = payload
            .get("op")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Protocol("frame has no `op` field".to_string()))?;

        let event_type = payload.get("type").and_then(Value::as_str);
        if op == "event" && event_type.is_none() {
            return Err(Error::Protocol("event frame has no `type` field".to_string()));
        }

        let frame = Frame::deserialize(payload)
            .map_err(|e| Error::Protocol(format!("invalid `{op}` frame: {e}")))?;

        let event = match frame {
            Frame::Ready(e) => Self::Ready(e),
            Frame::PlayerUpdate(e) => Self::PlayerUpdate(e),
            Frame::Stats(e) => Self::Stats(e),
            Frame::Event(EventFrame::TrackStart(e)) => Self::TrackStart(e),
            Frame::Event(EventFrame::TrackEnd(e)) => Self::TrackEnd(e),
            Frame::Event(EventFrame::TrackException(e)) => Self::TrackException(e),
            Frame::Event(EventFrame::TrackStuck(e)) => Self::TrackStuck(e),
            Frame::Event(EventFrame::WebSocketClosed(e)) => Self::WebSocketClosed(e),
            Frame::Event(EventFrame::Unknown) => {
                log::warn!("Ignoring unknown event type {:?}", event_type.unwrap_or_default());
                return Ok(None);
            }
            Frame::Unknown => {
                log::warn!("Ignoring unknown op {op:?}");
                return Ok(None);
            }
        };

        Ok(Some(event))
    }

    /// Discriminant of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Ready(_) => EventKind::Ready,
            Self::PlayerUpdate(_) => EventKind::PlayerUpdate,
            Self::Stats(_) => EventKind::Stats,
            Self::TrackStart(_) => EventKind::TrackStart,
            Self::TrackEnd(_) => EventKind::TrackEnd,
            Self::TrackException(_) => EventKind::TrackException,
            Self::TrackStuck(_) => EventKind::TrackStuck,
            Self::WebSocketClosed(_) => EventKind::WebSocketClosed,
        }
    }

    /// Guild the event concerns, for per-guild events
    pub fn guild_id(&self) -> Option<u64> {
        match self {
            Self::Ready(_) | Self::Stats(_) => None,
            Self::PlayerUpdate(e) => Some(e.guild_id),
            Self::TrackStart(e) => Some(e.guild_id),
            Self::TrackEnd(e) => Some(e.guild_id),
            Self::TrackException(e) => Some(e.guild_id),
            Self::TrackStuck(e) => Some(e.guild_id),
            Self::WebSocketClosed(e) => Some(e.guild_id),
        }
    }
}

/// A concrete event payload that listeners can subscribe to.
pub trait EventType: Sized + Send + 'static {
    /// Registry key for this payload
    const KIND: EventKind;

    /// Extract the payload, or `None` if `event` is another kind.
    fn from_event(event: Event) -> Option<Self>;
}

macro_rules! event_type {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl EventType for $ty {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: Event) -> Option<Self> {
                    match event {
                        Event::$variant(e) => Some(e),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Event {
                fn from(e: $ty) -> Self {
                    Event::$variant(e)
                }
            }
        )*
    };
}

event_type! {
    ReadyEvent => Ready,
    PlayerUpdateEvent => PlayerUpdate,
    StatsEvent => Stats,
    TrackStartEvent => TrackStart,
    TrackEndEvent => TrackEnd,
    TrackExceptionEvent => TrackException,
    TrackStuckEvent => TrackStuck,
    WebSocketClosedEvent => WebSocketClosed,
}
