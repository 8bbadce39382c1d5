// ABOUTME: Payload model definitions for the Lavalink v3 API
// ABOUTME: Player, track, stats, and filter shapes shared by events and REST

use super::serde_helpers::{duration_ms, snowflake, voice_ping};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback position report carried by `playerUpdate` frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Node time when the report was taken
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    /// Position within the current track
    #[serde(with = "duration_ms")]
    pub position: Duration,
    /// Whether the node is connected to the voice gateway
    pub connected: bool,
    /// Round trip to the voice server, `None` while disconnected
    #[serde(with = "voice_ping")]
    pub ping: Option<Duration>,
}

/// Node resource statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Players allocated on the node
    pub players: u32,
    /// Players currently playing
    pub playing_players: u32,
    /// Node uptime
    #[serde(with = "duration_ms")]
    pub uptime: Duration,
    /// JVM memory usage in bytes
    pub memory: Memory,
    /// CPU usage
    pub cpu: Cpu,
    /// Audio frame statistics, absent when no player is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_stats: Option<FrameStats>,
}

/// Memory figures in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    /// Free memory
    pub free: u64,
    /// Used memory
    pub used: u64,
    /// Allocated memory
    pub allocated: u64,
    /// Memory the JVM may still reserve
    pub reservable: u64,
}

/// CPU load figures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    /// Cores available to the node
    pub cores: u32,
    /// Whole-system load, 0.0 to 1.0
    pub system_load: f64,
    /// Load caused by the node, 0.0 to 1.0
    pub lavalink_load: f64,
}

/// Per-minute audio frame counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frames sent to Discord
    pub sent: i64,
    /// Frames that were empty
    pub nulled: i64,
    /// Expected minus sent frames, negative when ahead
    pub deficit: i64,
}

/// Why a track stopped playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackEndReason {
    /// The track played to the end
    Finished,
    /// The track failed to start
    LoadFailed,
    /// The player was stopped
    Stopped,
    /// Another track started
    Replaced,
    /// The player was cleaned up
    Cleanup,
}

impl TrackEndReason {
    /// Whether the next queued track should be started
    pub fn may_start_next(self) -> bool {
        matches!(self, Self::Finished | Self::LoadFailed)
    }
}

/// Severity attached to a track exception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExceptionSeverity {
    /// Expected failure such as an unavailable video
    Common,
    /// Unexplained failure, possibly a source change
    Suspicious,
    /// Bug in the node or a dependency
    Fatal,
}

/// Failure reported while loading or playing a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackException {
    /// Human readable message, if any
    pub message: Option<String>,
    /// How serious the failure is
    pub severity: ExceptionSeverity,
    /// Underlying cause
    pub cause: String,
}

/// Server-side player for one guild
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Guild the player belongs to
    #[serde(with = "snowflake")]
    pub guild_id: u64,
    /// Track currently loaded, if any
    pub track: Option<Track>,
    /// Volume, 0 to 1000
    pub volume: u32,
    /// Whether playback is paused
    pub paused: bool,
    /// Voice connection the player uses
    pub voice: VoiceState,
    /// Active audio filters
    #[serde(default)]
    pub filters: Filters,
}

/// An encoded track with its decoded metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Base64 track blob
    pub encoded: String,
    /// Decoded metadata
    pub info: TrackInfo,
}

/// Metadata decoded from a track blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Source-specific identifier
    pub identifier: String,
    /// Whether seeking is supported
    pub is_seekable: bool,
    /// Track author
    pub author: String,
    /// Track length
    #[serde(with = "duration_ms")]
    pub length: Duration,
    /// Whether the track is a live stream
    pub is_stream: bool,
    /// Current position
    #[serde(with = "duration_ms")]
    pub position: Duration,
    /// Track title
    pub title: String,
    /// Track URL, when the source has one
    pub uri: Option<String>,
    /// Source the track was loaded from
    pub source_name: String,
}

/// Discord voice connection details the node plays into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceState {
    /// Discord voice token
    pub token: String,
    /// Discord voice endpoint
    pub endpoint: String,
    /// Discord voice session id
    pub session_id: String,
    /// Whether the node is connected to the voice gateway
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,
    /// Voice gateway round trip in milliseconds, -1 when disconnected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<i64>,
}

/// Audio filters applied to a player. Unset filters are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Volume multiplier, 0.0 to 5.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    /// Equalizer band gains
    #[serde(default, rename = "equalizer", skip_serializing_if = "Option::is_none")]
    pub equalizers: Option<Vec<Equalizer>>,
    /// Vocal removal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub karaoke: Option<Karaoke>,
    /// Speed, pitch and rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timescale: Option<Timescale>,
    /// Volume oscillation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tremolo: Option<Tremolo>,
    /// Pitch oscillation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vibrato: Option<Vibrato>,
    /// Stereo panning rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Rotation>,
    /// Distortion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distortion: Option<Distortion>,
    /// Left/right channel mixing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_mix: Option<ChannelMix>,
    /// Low-pass filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low_pass: Option<LowPass>,
}

impl Filters {
    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Gain for one of the 15 equalizer bands (0-14)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equalizer {
    /// Band index
    pub band: u8,
    /// Gain multiplier, -0.25 to 1.0
    pub gain: f64,
}

/// Karaoke filter settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Karaoke {
    /// Effect level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    /// Mono level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mono_level: Option<f64>,
    /// Filter band in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_band: Option<f64>,
    /// Filter width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_width: Option<f64>,
}

/// Timescale filter settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timescale {
    /// Playback speed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Pitch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

/// Tremolo filter settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Tremolo {
    /// Oscillation frequency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Oscillation depth, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

/// Vibrato filter settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vibrato {
    /// Oscillation frequency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Oscillation depth, 0.0 to 1.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

/// Rotation filter settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Rotation frequency in Hz
    #[serde(default, rename = "rotationHz", skip_serializing_if = "Option::is_none")]
    pub rotation_hz: Option<f64>,
}

/// Distortion filter coefficients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distortion {
    /// Sine offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sin_offset: Option<f64>,
    /// Sine scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sin_scale: Option<f64>,
    /// Cosine offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_offset: Option<f64>,
    /// Cosine scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cos_scale: Option<f64>,
    /// Tangent offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tan_offset: Option<f64>,
    /// Tangent scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tan_scale: Option<f64>,
    /// Overall offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    /// Overall scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// Channel mix factors
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelMix {
    /// Left into left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_to_left: Option<f64>,
    /// Left into right
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_to_right: Option<f64>,
    /// Right into left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_to_left: Option<f64>,
    /// Right into right
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_to_right: Option<f64>,
}

/// Low-pass filter settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LowPass {
    /// Smoothing factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<f64>,
}
