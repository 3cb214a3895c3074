//! Playback queue driven by engine callbacks
//!
//! Holds three observable cells: the playing flag, the current track and the
//! pending tracks. `current` is only ever set from the engine's own
//! `TrackStarted` event, never by popping the queue, so the current track is
//! never also pending at any point an observer can see.

use crate::engine::{AudioEngine, EngineError, EngineEvent};
use crate::snapshot::{PlaybackSnapshot, SnapshotStream};
use jukebox_common::Track;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Result of [`PlaybackQueue::enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Engine was idle and started the track right away
    Started,
    /// Appended behind the active track; 1-based position
    Queued { position: usize },
}

pub struct PlaybackQueue {
    engine: Arc<dyn AudioEngine>,
    is_playing: watch::Sender<bool>,
    current: watch::Sender<Option<Track>>,
    pending: watch::Sender<VecDeque<Track>>,
}

impl PlaybackQueue {
    pub fn new(engine: Arc<dyn AudioEngine>) -> Self {
        Self {
            engine,
            is_playing: watch::channel(false).0,
            current: watch::channel(None).0,
            pending: watch::channel(VecDeque::new()).0,
        }
    }

    /// Observe combined snapshots of the three cells
    pub fn watch(&self) -> SnapshotStream {
        SnapshotStream::new(
            self.is_playing.subscribe(),
            self.current.subscribe(),
            self.pending.subscribe(),
        )
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: *self.is_playing.borrow(),
            current: self.current.borrow().clone(),
            queue: self.pending.borrow().iter().cloned().collect(),
        }
    }

    pub fn is_playing(&self) -> bool {
        *self.is_playing.borrow()
    }

    pub fn current(&self) -> Option<Track> {
        self.current.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    /// Play `track` now if the engine is idle, otherwise append it
    pub async fn enqueue(&self, track: Track) -> Result<EnqueueOutcome, EngineError> {
        if self.engine.playing_track().is_none() {
            debug!(track = %track.title(), "Engine idle, starting track");
            self.engine.play(track).await?;
            return Ok(EnqueueOutcome::Started);
        }

        let mut position = 0;
        self.pending.send_modify(|pending| {
            pending.push_back(track);
            position = pending.len();
        });
        Ok(EnqueueOutcome::Queued { position })
    }

    /// Resume (`true`) or pause (`false`)
    pub async fn set_playing(&self, playing: bool) -> Result<(), EngineError> {
        self.engine.set_paused(!playing).await
    }

    /// Stop the current track; the resulting end event advances the queue
    pub async fn skip(&self) -> Result<(), EngineError> {
        self.engine.stop().await
    }

    /// Drop every pending track; the current track keeps playing
    pub fn clear(&self) {
        self.pending.send_if_modified(|pending| {
            let had_tracks = !pending.is_empty();
            pending.clear();
            had_tracks
        });
    }

    /// Reset all state and release the engine player
    pub async fn close(&self) -> Result<(), EngineError> {
        self.pending.send_if_modified(|pending| {
            let had_tracks = !pending.is_empty();
            pending.clear();
            had_tracks
        });
        self.current.send_if_modified(|current| current.take().is_some());
        self.is_playing.send_if_modified(|playing| std::mem::replace(playing, false));

        self.engine.destroy().await
    }

    /// Apply one engine callback
    ///
    /// Must be called in the order the engine delivered the events.
    pub async fn handle_engine_event(&self, event: EngineEvent) -> Result<(), EngineError> {
        match event {
            EngineEvent::Paused => self.set_flag(false),
            EngineEvent::Resumed => self.set_flag(true),
            EngineEvent::TrackStarted(track) => {
                // A track started outside the queue can still be pending
                let id = track.id();
                self.pending.send_if_modified(|pending| {
                    let before = pending.len();
                    pending.retain(|t| t.id() != id);
                    pending.len() != before
                });
                self.current.send_replace(Some(track));
                self.set_flag(true);
            }
            EngineEvent::TrackEnded { track, reason } => {
                if reason.is_replaced() {
                    debug!(track = %track.title(), "Track replaced, queue untouched");
                    return Ok(());
                }

                let mut next = None;
                self.pending.send_if_modified(|pending| {
                    next = pending.pop_front();
                    next.is_some()
                });

                match next {
                    Some(next) => {
                        debug!(ended = %track.title(), next = %next.title(), ?reason, "Advancing queue");
                        self.engine.play(next).await?;
                    }
                    None => {
                        debug!(ended = %track.title(), ?reason, "Queue exhausted");
                        self.set_flag(false);
                        self.current.send_if_modified(|current| current.take().is_some());
                    }
                }
            }
            EngineEvent::TrackException { track, message } => {
                warn!(track = %track.title(), error = %message, "Track playback failed");
                self.set_flag(false);
            }
        }
        Ok(())
    }

    fn set_flag(&self, playing: bool) {
        self.is_playing.send_if_modified(|current| {
            if *current == playing {
                false
            } else {
                *current = playing;
                true
            }
        });
    }
}

impl std::fmt::Debug for PlaybackQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackQueue")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
