//! Voice transport and presence seams

use crate::engine::FrameProvider;
use async_trait::async_trait;
use jukebox_common::{ChannelId, UserId};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Failure reported by the voice transport or presence source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Voice connection failed: {0}")]
    Connect(String),

    #[error("Voice connection shutdown failed: {0}")]
    Shutdown(String),

    #[error("Presence lookup failed: {0}")]
    Presence(String),
}

/// Someone currently in a voice channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupant {
    pub user_id: UserId,
    pub is_bot: bool,
}

impl Occupant {
    pub fn user(user_id: UserId) -> Self {
        Self { user_id, is_bot: false }
    }

    pub fn bot(user_id: UserId) -> Self {
        Self { user_id, is_bot: true }
    }
}

/// A user's voice channel changed
///
/// `channel_id` is the channel the user is in now; `None` means they left
/// voice entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceEvent {
    pub user_id: UserId,
    pub channel_id: Option<ChannelId>,
    pub is_bot: bool,
}

impl PresenceEvent {
    pub fn joined(user_id: UserId, channel_id: ChannelId) -> Self {
        Self {
            user_id,
            channel_id: Some(channel_id),
            is_bot: false,
        }
    }

    pub fn left(user_id: UserId) -> Self {
        Self {
            user_id,
            channel_id: None,
            is_bot: false,
        }
    }
}

/// Live voice connection
#[async_trait]
pub trait VoiceConnection: Send + Sync {
    /// Identity this connection speaks as
    fn self_id(&self) -> UserId;

    async fn shutdown(&self) -> Result<(), TransportError>;
}

/// Connects to voice channels
#[async_trait]
pub trait VoiceTransport: Send + Sync {
    async fn connect(
        &self,
        channel: ChannelId,
        frames: Arc<dyn FrameProvider>,
    ) -> Result<Box<dyn VoiceConnection>, TransportError>;
}

/// Who is in a channel, and who comes and goes
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// Snapshot of the channel's current occupants
    async fn occupants(&self, channel: ChannelId) -> Result<Vec<Occupant>, TransportError>;

    /// Join/leave events relevant to `channel`
    ///
    /// Sources that deliver presence through a central router instead can
    /// return a receiver whose sender is already dropped.
    fn subscribe(&self, channel: ChannelId) -> mpsc::UnboundedReceiver<PresenceEvent>;
}
