//! Track handles shared between the engine, the queue and rendering

use crate::ids::{TrackId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Static metadata of a playable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// Display title
    pub title: String,
    /// Source URI the track was loaded from
    pub uri: String,
    /// Author / uploader / artist
    pub author: String,
    /// Total duration in milliseconds
    pub duration_ms: u64,
}

impl TrackInfo {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// User who asked for a track
///
/// Holds only the identifier and a display name, never the user object
/// itself, so a track outliving the member does not keep anything alive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: UserId,
    pub display_name: String,
}

impl Requester {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }

    /// Platform mention markup for this user
    pub fn mention(&self) -> String {
        format!("<@{}>", self.user_id)
    }
}

/// Opaque handle to playable media
///
/// Cheap to clone: metadata is shared behind an `Arc`. Equality is identity
/// of the loaded instance ([`TrackId`]), not of the URI.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    info: Arc<TrackInfo>,
    requester: Option<Requester>,
}

impl Track {
    pub fn new(info: TrackInfo) -> Self {
        Self {
            id: TrackId::new(),
            info: Arc::new(info),
            requester: None,
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }

    pub fn title(&self) -> &str {
        &self.info.title
    }

    pub fn requester(&self) -> Option<&Requester> {
        self.requester.as_ref()
    }

    /// Stamp the requesting user onto the track
    ///
    /// The requester is set once; a track that already carries one keeps it.
    pub fn with_requester(mut self, requester: Requester) -> Self {
        if self.requester.is_none() {
            self.requester = Some(requester);
        }
        self
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}
