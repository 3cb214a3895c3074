//! Audio engine seam
//!
//! The engine decodes and plays media; this crate only drives it and reacts
//! to its callbacks. One engine player belongs to exactly one session.

use async_trait::async_trait;
use jukebox_common::Track;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why the engine stopped playing a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Track played to the end
    Finished,
    /// Track could not be loaded or decoded
    LoadFailed,
    /// Stopped on request (skip)
    Stopped,
    /// Another track was started on top of it; an internal engine transition
    Replaced,
    /// Player released while the track was active
    Cleanup,
}

impl EndReason {
    pub fn is_replaced(self) -> bool {
        matches!(self, EndReason::Replaced)
    }
}

/// Callback events delivered by the engine, in engine order
#[derive(Debug, Clone)]
pub enum EngineEvent {
    Paused,
    Resumed,
    TrackStarted(Track),
    TrackEnded { track: Track, reason: EndReason },
    TrackException { track: Track, message: String },
}

/// Failure reported by the engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Audio engine error: {0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Source of encoded audio frames pulled by the voice connection
pub trait FrameProvider: Send + Sync {
    /// Next encoded frame, or `None` when there is nothing to send right now
    fn provide(&self) -> Option<Vec<u8>>;
}

/// One engine player instance
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Track the engine considers active (a paused track still counts)
    fn playing_track(&self) -> Option<Track>;

    /// Start `track` immediately, replacing whatever is active
    async fn play(&self, track: Track) -> Result<(), EngineError>;

    async fn set_paused(&self, paused: bool) -> Result<(), EngineError>;

    /// Stop the active track; the engine then emits `TrackEnded(Stopped)`
    async fn stop(&self) -> Result<(), EngineError>;

    /// Release the player. No events are delivered afterwards.
    async fn destroy(&self) -> Result<(), EngineError>;

    /// Subscribe to callback events
    fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent>;

    /// Frame source handed to the voice connection
    fn frames(&self) -> Arc<dyn FrameProvider>;
}

/// Creates a fresh engine player for each new session
pub trait PlayerFactory: Send + Sync {
    fn create_player(&self) -> Arc<dyn AudioEngine>;
}
