//! Combined playback snapshots and the debounce stage
//!
//! [`PlaybackQueue`](crate::queue::PlaybackQueue) publishes three independent
//! cells (playing flag, current track, pending queue). [`SnapshotStream`]
//! watches all three and yields a fresh [`PlaybackSnapshot`] whenever any of
//! them changes, built from the last known value of each cell.
//! [`next_settled`] collapses a burst of snapshots into the last one.

use jukebox_common::Track;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::watch;

/// Immutable point-in-time view of a session's playback state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub current: Option<Track>,
    /// Pending tracks in play order; never contains `current`
    pub queue: Vec<Track>,
}

impl PlaybackSnapshot {
    pub fn has_track(&self) -> bool {
        self.current.is_some()
    }

    pub fn has_queue(&self) -> bool {
        !self.queue.is_empty()
    }
}

/// Observer over the three playback cells
///
/// The first call to [`next`](Self::next) yields the current state
/// immediately; later calls wait for a change.
pub struct SnapshotStream {
    is_playing: watch::Receiver<bool>,
    current: watch::Receiver<Option<Track>>,
    queue: watch::Receiver<VecDeque<Track>>,
    primed: bool,
}

impl SnapshotStream {
    pub(crate) fn new(
        is_playing: watch::Receiver<bool>,
        current: watch::Receiver<Option<Track>>,
        queue: watch::Receiver<VecDeque<Track>>,
    ) -> Self {
        Self {
            is_playing,
            current,
            queue,
            primed: false,
        }
    }

    /// Next snapshot, or `None` once the publishing queue is gone
    ///
    /// Cancel-safe: dropping the future loses no change notification.
    pub async fn next(&mut self) -> Option<PlaybackSnapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.latest());
        }

        tokio::select! {
            changed = self.is_playing.changed() => changed.ok()?,
            changed = self.current.changed() => changed.ok()?,
            changed = self.queue.changed() => changed.ok()?,
        }

        Some(self.latest())
    }

    /// Assemble a snapshot from the last value of every cell
    pub fn latest(&mut self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: *self.is_playing.borrow_and_update(),
            current: self.current.borrow_and_update().clone(),
            queue: self.queue.borrow_and_update().iter().cloned().collect(),
        }
    }
}

/// Wait for the next burst of snapshots to go quiet and return its last one
///
/// The quiet timer restarts on every snapshot; a snapshot is returned once
/// `window` passes with no further change. If the stream ends mid-burst the
/// last snapshot seen is still returned. `None` means the stream had already
/// ended.
pub async fn next_settled(
    stream: &mut SnapshotStream,
    window: Duration,
) -> Option<PlaybackSnapshot> {
    let mut latest = stream.next().await?;

    loop {
        match tokio::time::timeout(window, stream.next()).await {
            Ok(Some(snapshot)) => latest = snapshot,
            Ok(None) | Err(_) => return Some(latest),
        }
    }
}
