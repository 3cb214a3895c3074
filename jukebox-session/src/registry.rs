//! Guild-keyed session registry
//!
//! At most one live session per guild. The per-guild slot is created
//! atomically through the `DashMap` entry API, then filled under that slot's
//! async lock, so two play requests racing for the same guild end up sharing
//! one session instead of starting two.

use crate::engine::PlayerFactory;
use crate::error::Result;
use crate::loader::{resolve_tracks, TrackSource};
use crate::response::ResponseLifecycle;
use crate::session::{SessionCoordinator, SessionHandle, SessionParams};
use crate::transport::{PresenceEvent, PresenceSource, VoiceTransport};
use dashmap::DashMap;
use futures::future::join_all;
use jukebox_common::config::JukeboxConfig;
use jukebox_common::events::EventBus;
use jukebox_common::{ChannelId, GuildId, Requester, SessionId};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

type Slot = Arc<Mutex<Option<SessionHandle>>>;

/// External collaborators shared by every session
#[derive(Clone)]
pub struct Collaborators {
    pub players: Arc<dyn PlayerFactory>,
    pub transport: Arc<dyn VoiceTransport>,
    pub presence: Arc<dyn PresenceSource>,
    pub tracks: Arc<dyn TrackSource>,
}

/// A user asked to play something
#[derive(Debug, Clone)]
pub struct PlayRequest {
    pub guild_id: GuildId,
    /// Voice channel the requester is in
    pub channel_id: ChannelId,
    pub requester: Requester,
    /// URLs or search queries, loaded in order
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Nothing matched; no session was touched
    NoMatches,
    Enqueued { session_id: SessionId, tracks: usize },
}

pub struct SessionRegistry {
    slots: Arc<DashMap<GuildId, Slot>>,
    collaborators: Collaborators,
    config: JukeboxConfig,
    events: EventBus,
}

impl SessionRegistry {
    pub fn new(collaborators: Collaborators, config: JukeboxConfig, events: EventBus) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            collaborators,
            config,
            events,
        }
    }

    /// Registry with its own event bus sized from `config.events`
    pub fn from_config(collaborators: Collaborators, config: JukeboxConfig) -> Self {
        let events = EventBus::new(config.events.capacity);
        Self::new(collaborators, config, events)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Live session for `guild`, if any
    pub async fn session(&self, guild: GuildId) -> Option<SessionHandle> {
        let slot = self.slots.get(&guild).map(|s| Arc::clone(s.value()))?;
        let guard = slot.lock().await;
        guard.as_ref().filter(|h| !h.is_done()).cloned()
    }

    /// Every live session
    pub async fn sessions(&self) -> Vec<SessionHandle> {
        let slots: Vec<Slot> = self.slots.iter().map(|s| Arc::clone(s.value())).collect();

        let mut handles = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(handle) = slot.lock().await.as_ref().filter(|h| !h.is_done()) {
                handles.push(handle.clone());
            }
        }
        handles
    }

    /// Resolve the request's tracks and enqueue them on the guild session
    ///
    /// `response` is the request's deferred response. A newly started session
    /// adopts it; otherwise it is deleted once the tracks are queued. On
    /// `NoMatches` or an error it is left to the caller for reporting.
    pub async fn play(
        &self,
        request: PlayRequest,
        response: &mut ResponseLifecycle,
    ) -> Result<PlayOutcome> {
        let tracks = resolve_tracks(
            self.collaborators.tracks.as_ref(),
            &request.identifiers,
            self.config.session.load_timeout(),
        )
        .await?;

        if tracks.is_empty() {
            debug!(guild_id = %request.guild_id, "No tracks matched");
            return Ok(PlayOutcome::NoMatches);
        }

        let session = self
            .get_or_start(request.guild_id, request.channel_id, response)
            .await?;

        let count = tracks.len();
        for track in tracks {
            session.try_enqueue(track, request.requester.clone()).await?;
        }

        if let Err(e) = response.delete().await {
            warn!(guild_id = %request.guild_id, error = %e, "Failed to delete play response");
        }

        Ok(PlayOutcome::Enqueued {
            session_id: session.id(),
            tracks: count,
        })
    }

    /// Session for `guild` in `channel`, starting one if needed
    ///
    /// A live session in a different channel is disconnected and replaced.
    /// A newly started session takes over `response`; if the start fails the
    /// response has already been deleted.
    pub async fn get_or_start(
        &self,
        guild: GuildId,
        channel: ChannelId,
        response: &mut ResponseLifecycle,
    ) -> Result<SessionHandle> {
        loop {
            let slot = Arc::clone(&self.slots.entry(guild).or_default());
            let mut guard = slot.lock().await;

            // The done watcher may have dropped this slot while we waited
            if !self.holds_slot(guild, &slot) {
                continue;
            }

            if let Some(existing) = guard.take() {
                if !existing.is_done() && existing.channel_id() == channel {
                    *guard = Some(existing.clone());
                    return Ok(existing);
                }
                if !existing.is_done() {
                    info!(
                        guild_id = %guild,
                        from = %existing.channel_id(),
                        to = %channel,
                        "Replacing session in another channel"
                    );
                    existing.disconnect().await;
                }
            }

            let handle = SessionCoordinator::start(SessionParams {
                guild_id: guild,
                channel_id: channel,
                engine: self.collaborators.players.create_player(),
                transport: Arc::clone(&self.collaborators.transport),
                presence: Arc::clone(&self.collaborators.presence),
                response: response.take(),
                session_config: self.config.session.clone(),
                render_config: self.config.render.clone(),
                events: self.events.clone(),
            })
            .await?;

            *guard = Some(handle.clone());
            self.remove_when_done(guild, Arc::clone(&slot), handle.clone());
            return Ok(handle);
        }
    }

    /// Route a panel action to the guild session
    pub async fn route_action(&self, guild: GuildId, action_id: &str) -> bool {
        match self.session(guild).await {
            Some(session) => session.handle_action(action_id).await,
            None => false,
        }
    }

    /// Route a voice presence change to the guild session
    pub async fn route_presence(&self, guild: GuildId, event: PresenceEvent) {
        if let Some(session) = self.session(guild).await {
            session.presence_event(event).await;
        }
    }

    /// The bot was removed from voice by someone else
    pub async fn on_self_disconnected(&self, guild: GuildId) {
        let Some((_, slot)) = self.slots.remove(&guild) else {
            return;
        };

        let session = slot.lock().await.take();
        if let Some(session) = session {
            info!(guild_id = %guild, session_id = %session.id(), "Removed from voice, ending session");
            session.disconnect().await;
        }
    }

    /// Disconnect every session concurrently and wait for all of them
    pub async fn shutdown_all(&self) {
        let sessions = self.sessions().await;
        info!(count = sessions.len(), "Shutting down all sessions");

        join_all(sessions.iter().map(|s| s.disconnect())).await;
    }

    fn holds_slot(&self, guild: GuildId, slot: &Slot) -> bool {
        self.slots
            .get(&guild)
            .is_some_and(|current| Arc::ptr_eq(current.value(), slot))
    }

    fn remove_when_done(&self, guild: GuildId, slot: Slot, handle: SessionHandle) {
        let slots = Arc::clone(&self.slots);

        tokio::spawn(async move {
            handle.await_done().await;

            let mut guard = slot.lock().await;
            if guard.as_ref().is_some_and(|h| h.id() == handle.id()) {
                *guard = None;
                slots.remove_if(&guild, |_, current| Arc::ptr_eq(current, &slot));
                debug!(guild_id = %guild, session_id = %handle.id(), "Session removed from registry");
            }
        });
    }
}
