//! Cloneable front door to a running session

use super::Command;
use crate::action::SessionAction;
use crate::error::{Error, Result};
use crate::snapshot::PlaybackSnapshot;
use crate::transport::PresenceEvent;
use jukebox_common::{ChannelId, GuildId, Requester, SessionId, Track, UserId};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Handle to a session actor
///
/// Every operation becomes a no-op once the session is done.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    guild_id: GuildId,
    channel_id: ChannelId,
    commands: mpsc::Sender<Command>,
    done: CancellationToken,
}

impl SessionHandle {
    pub(super) fn new(
        id: SessionId,
        guild_id: GuildId,
        channel_id: ChannelId,
        commands: mpsc::Sender<Command>,
        done: CancellationToken,
    ) -> Self {
        Self {
            id,
            guild_id,
            channel_id,
            commands,
            done,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    /// Stamp `requester` onto `track` and hand it to the queue
    pub async fn enqueue(&self, track: Track, requester: Requester) {
        let _ = self.try_enqueue(track, requester).await;
    }

    /// Like [`enqueue`](Self::enqueue) but reports a finished session
    pub async fn try_enqueue(&self, track: Track, requester: Requester) -> Result<()> {
        self.send(Command::Enqueue(track.with_requester(requester)))
            .await
    }

    /// Apply a panel action by its wire id
    ///
    /// Returns `false` for an unknown id or a finished session.
    pub async fn handle_action(&self, action_id: &str) -> bool {
        match SessionAction::from_id(action_id) {
            Some(action) => self.apply_action(action).await,
            None => {
                warn!(session_id = %self.id, action_id, "Unknown panel action");
                false
            }
        }
    }

    pub async fn apply_action(&self, action: SessionAction) -> bool {
        let (reply, response) = oneshot::channel();
        if self.send(Command::Action { action, reply }).await.is_err() {
            return false;
        }
        response.await.unwrap_or(false)
    }

    /// A user's voice channel changed; `channel_id` is `None` when they left voice
    pub async fn on_presence_event(&self, user_id: UserId, channel_id: Option<ChannelId>) {
        self.presence_event(PresenceEvent {
            user_id,
            channel_id,
            is_bot: false,
        })
        .await;
    }

    pub async fn presence_event(&self, event: PresenceEvent) {
        let _ = self.send(Command::Presence(event)).await;
    }

    /// Latest playback state, `None` once the session is done
    pub async fn snapshot(&self) -> Option<PlaybackSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await.ok()?;
        response.await.ok()
    }

    /// Tear the session down and wait until it is done
    ///
    /// Safe to call any number of times from any number of handles; teardown
    /// runs once and every caller returns after it completed.
    pub async fn disconnect(&self) {
        let _ = self.send(Command::Disconnect).await;
        self.done.cancelled().await;
    }

    /// Wait for the session to release all of its resources
    pub async fn await_done(&self) {
        self.done.cancelled().await;
    }

    pub fn is_done(&self) -> bool {
        self.done.is_cancelled()
    }

    async fn send(&self, command: Command) -> Result<()> {
        if self.is_done() {
            return Err(Error::SessionClosed);
        }
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SessionClosed)
    }
}
