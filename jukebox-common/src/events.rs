//! Session lifecycle events and the broadcast bus that carries them
//!
//! Every session publishes onto one shared [`EventBus`]. Subscribers are the
//! process-level observers: error reporting, metrics, the registry's own
//! bookkeeping. Having no subscriber is normal, so most publishers use
//! [`EventBus::emit_lossy`].

use crate::ids::{ChannelId, GuildId, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Teardown step reported when a best-effort teardown action fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownStep {
    /// Releasing the engine player and clearing queue state
    CloseQueue,
    /// Deleting the remote response resource
    DeleteResponse,
    /// Shutting down the voice connection
    ShutdownConnection,
}

impl std::fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeardownStep::CloseQueue => write!(f, "close_queue"),
            TeardownStep::DeleteResponse => write!(f, "delete_response"),
            TeardownStep::ShutdownConnection => write!(f, "shutdown_connection"),
        }
    }
}

/// Session event types
///
/// Serialized with an internal `type` tag so observers can forward them as
/// JSON without an extra envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Voice connection established and listener set initialised
    SessionStarted {
        session_id: SessionId,
        guild_id: GuildId,
        channel_id: ChannelId,
        /// Listeners present at connect time
        listeners: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A debounced snapshot reached the response surface
    SnapshotRendered {
        session_id: SessionId,
        is_playing: bool,
        /// Title of the current track, if any
        current_title: Option<String>,
        queue_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Rendering failed for a reason other than "resource already gone"
    ///
    /// The render loop keeps running after this event.
    RenderFailed {
        session_id: SessionId,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Listener set changed after a presence event
    ListenersChanged {
        session_id: SessionId,
        listeners: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One teardown step failed; the remaining steps still ran
    TeardownStepFailed {
        session_id: SessionId,
        step: TeardownStep,
        error: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Teardown finished and the done marker fired
    SessionEnded {
        session_id: SessionId,
        guild_id: GuildId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Session the event belongs to
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::SessionStarted { session_id, .. }
            | SessionEvent::SnapshotRendered { session_id, .. }
            | SessionEvent::RenderFailed { session_id, .. }
            | SessionEvent::ListenersChanged { session_id, .. }
            | SessionEvent::TeardownStepFailed { session_id, .. }
            | SessionEvent::SessionEnded { session_id, .. } => *session_id,
        }
    }
}

/// One-to-many broadcast of [`SessionEvent`]s
///
/// Cloning shares the underlying channel.
///
/// # Examples
///
/// ```
/// use jukebox_common::events::{EventBus, SessionEvent};
/// use jukebox_common::ids::{GuildId, SessionId};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(SessionEvent::SessionEnded {
///     session_id: SessionId::new(),
///     guild_id: GuildId::new(1),
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
