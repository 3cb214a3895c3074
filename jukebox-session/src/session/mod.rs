//! One playback session per voice channel
//!
//! A session runs as a single actor task. Every input (engine callbacks,
//! presence events, panel actions, debounced render ticks, caller requests)
//! is funneled into the actor's command channel and applied one at a time,
//! so the queue, the listener set and the response lifecycle never see
//! concurrent mutation.
//!
//! ```text
//! engine events ──┐
//! presence events ├──► command channel ──► actor ──► PlaybackQueue
//! render loop ────┤                          │   ──► PresenceTracker
//! SessionHandle ──┘                          └─► ResponseLifecycle
//! ```

mod coordinator;
mod handle;
mod render_loop;

pub use coordinator::{SessionCoordinator, SessionParams};
pub use handle::SessionHandle;

use crate::action::SessionAction;
use crate::engine::EngineEvent;
use crate::snapshot::PlaybackSnapshot;
use crate::transport::PresenceEvent;
use jukebox_common::Track;
use tokio::sync::oneshot;

/// Inbound message for a session actor
#[derive(Debug)]
pub(crate) enum Command {
    Enqueue(Track),
    Action {
        action: SessionAction,
        reply: oneshot::Sender<bool>,
    },
    Presence(PresenceEvent),
    Engine(EngineEvent),
    /// Settled snapshot from the render loop
    Render(PlaybackSnapshot),
    Snapshot(oneshot::Sender<PlaybackSnapshot>),
    Disconnect,
}
