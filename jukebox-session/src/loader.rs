//! Request-scoped track loading
//!
//! Loading belongs to the play request, not to a session: a stalled or
//! failing source fails the request and never reaches a running session.

use async_trait::async_trait;
use jukebox_common::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// How alarming a load failure is, for display purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Expected failures (unavailable video, region block)
    Benign,
    /// Unusual but not necessarily a fault on our side
    Suspicious,
    /// Anything unexplained, including timeouts
    Fatal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Track load failed: {message}")]
    Failed { message: String, severity: Severity },

    #[error("Track load timed out after {0:?}")]
    Timeout(Duration),
}

impl LoadError {
    pub fn failed(message: impl Into<String>, severity: Severity) -> Self {
        LoadError::Failed {
            message: message.into(),
            severity,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            LoadError::Failed { severity, .. } => *severity,
            LoadError::Timeout(_) => Severity::Fatal,
        }
    }
}

/// Resolves user input (URL or search query) into playable tracks
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Every track `identifier` resolves to; empty when nothing matched
    async fn load_item(&self, identifier: &str) -> Result<Vec<Track>, LoadError>;
}

/// Load every identifier in order under one overall `timeout`
pub async fn resolve_tracks(
    source: &dyn TrackSource,
    identifiers: &[String],
    timeout: Duration,
) -> Result<Vec<Track>, LoadError> {
    let load_all = async {
        let mut tracks = Vec::new();
        for identifier in identifiers {
            let loaded = source.load_item(identifier).await?;
            debug!(identifier = %identifier, count = loaded.len(), "Resolved identifier");
            tracks.extend(loaded);
        }
        Ok(tracks)
    };

    match tokio::time::timeout(timeout, load_all).await {
        Ok(result) => result,
        Err(_) => {
            warn!(?timeout, "Track loading timed out");
            Err(LoadError::Timeout(timeout))
        }
    }
}
