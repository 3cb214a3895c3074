//! Panel content derived from a playback snapshot
//!
//! The response surface decides how a panel looks; this module only decides
//! what is on it. Text localisation happens on the surface side.

use crate::action::SessionAction;
use crate::snapshot::PlaybackSnapshot;
use jukebox_common::config::RenderConfig;
use jukebox_common::human_time::format_track_duration;
use jukebox_common::{Requester, Track};
use serde::Serialize;

/// Fixed per-line overhead counted against the queue budget
/// (numbering, link markup, separators, newline)
const QUEUE_LINE_OVERHEAD: usize = 16;

/// Playback status shown next to the current track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Playing,
    Paused,
}

/// Everything the surface needs to draw the session panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPanel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub now_playing: Option<NowPlaying>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueSection>,
    /// Buttons to offer, in display order
    pub actions: Vec<SessionAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NowPlaying {
    pub title: String,
    pub uri: String,
    pub author: String,
    pub status: PlaybackStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Requester>,
    /// Human-readable track length
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSection {
    pub lines: Vec<QueueLine>,
    /// Tracks left off the list because the budget ran out
    pub overflow: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueLine {
    /// 1-based position in the queue
    pub position: usize,
    pub title: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester: Option<Requester>,
}

impl QueueLine {
    fn from_track(position: usize, track: &Track) -> Self {
        Self {
            position,
            title: track.info().title.clone(),
            uri: track.info().uri.clone(),
            requester: track.requester().cloned(),
        }
    }

    /// Characters this line is expected to take once drawn
    fn weight(&self) -> usize {
        let requester = self
            .requester
            .as_ref()
            .map(|r| r.mention().chars().count())
            .unwrap_or(0);

        self.title.chars().count()
            + self.uri.chars().count()
            + requester
            + self.position.to_string().len()
            + QUEUE_LINE_OVERHEAD
    }
}

/// Build the panel for `snapshot`
pub fn render_panel(snapshot: &PlaybackSnapshot, config: &RenderConfig) -> RenderedPanel {
    RenderedPanel {
        now_playing: snapshot
            .current
            .as_ref()
            .map(|track| now_playing(track, snapshot.is_playing)),
        queue: queue_section(&snapshot.queue, config.queue_char_budget),
        actions: available_actions(snapshot),
    }
}

fn now_playing(track: &Track, is_playing: bool) -> NowPlaying {
    let info = track.info();
    NowPlaying {
        title: info.title.clone(),
        uri: info.uri.clone(),
        author: info.author.clone(),
        status: if is_playing {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        },
        requester: track.requester().cloned(),
        duration: format_track_duration(info.duration_ms),
    }
}

fn queue_section(queue: &[Track], budget: usize) -> Option<QueueSection> {
    if queue.is_empty() {
        return None;
    }

    let mut lines = Vec::new();
    let mut used = 0;

    for (index, track) in queue.iter().enumerate() {
        let line = QueueLine::from_track(index + 1, track);
        let weight = line.weight();
        if used + weight > budget {
            return Some(QueueSection {
                lines,
                overflow: queue.len() - index,
            });
        }
        used += weight;
        lines.push(line);
    }

    Some(QueueSection { lines, overflow: 0 })
}

/// Actions that make sense for `snapshot`
///
/// Pause/Resume need a track, Skip needs a track and something queued behind
/// it, Clear needs a queue, Leave is always offered.
pub fn available_actions(snapshot: &PlaybackSnapshot) -> Vec<SessionAction> {
    let mut actions = Vec::with_capacity(4);

    if snapshot.has_track() {
        actions.push(if snapshot.is_playing {
            SessionAction::Pause
        } else {
            SessionAction::Resume
        });
    }
    if snapshot.has_track() && snapshot.has_queue() {
        actions.push(SessionAction::Skip);
    }
    if snapshot.has_queue() {
        actions.push(SessionAction::Clear);
    }
    actions.push(SessionAction::Leave);

    actions
}
