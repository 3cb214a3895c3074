//! Test helpers for jukebox-session integration tests
//!
//! Provides recording in-memory collaborators:
//! - MockEngine / MockPlayerFactory: scriptable audio engine
//! - MockTransport / MockPresence: voice connection and channel occupants
//! - RecordingSurface: response surface that records every panel
//! - MockTrackSource: identifier to track resolution
//!
//! Tests run on tokio's paused clock; [`settle`] lets every spawned task run
//! to idle without crossing a debounce window.

#![allow(dead_code)]

pub mod engine;
pub mod platform;

pub use engine::{EngineCall, MockEngine, MockPlayerFactory};
pub use platform::{MockPresence, MockTransport, RecordingSurface, SurfaceCall, BOT_ID};

use async_trait::async_trait;
use jukebox_common::config::JukeboxConfig;
use jukebox_common::events::{EventBus, SessionEvent};
use jukebox_common::{ChannelId, GuildId, Requester, Track, TrackInfo, UserId};
use jukebox_session::loader::{LoadError, TrackSource};
use jukebox_session::registry::{Collaborators, SessionRegistry};
use jukebox_session::response::ResponseLifecycle;
use jukebox_session::session::{SessionCoordinator, SessionHandle, SessionParams};
use jukebox_session::transport::Occupant;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

pub const GUILD: GuildId = GuildId(100);
pub const CHANNEL: ChannelId = ChannelId(200);
pub const OTHER_CHANNEL: ChannelId = ChannelId(201);
pub const LISTENER: UserId = UserId(300);
pub const SECOND_LISTENER: UserId = UserId(301);

/// Well short of the default 300ms debounce window
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Long enough for any pending debounce window to fire
pub async fn past_debounce() {
    tokio::time::sleep(Duration::from_millis(1_000)).await;
}

pub fn track(title: &str) -> Track {
    Track::new(TrackInfo {
        title: title.to_string(),
        uri: format!("https://example.com/{}", title),
        author: "tester".to_string(),
        duration_ms: 180_000,
    })
}

pub fn requester() -> Requester {
    Requester::new(LISTENER, "listener")
}

/// Drain every event published so far
pub fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// One running session wired to recording collaborators
pub struct SessionHarness {
    pub session: SessionHandle,
    pub engine: Arc<MockEngine>,
    pub transport: Arc<MockTransport>,
    pub presence: Arc<MockPresence>,
    pub surface: Arc<RecordingSurface>,
    pub events: broadcast::Receiver<SessionEvent>,
}

impl SessionHarness {
    /// Start a session in [`CHANNEL`] with [`LISTENER`] and the bot present
    pub async fn start() -> Self {
        Self::start_with(vec![Occupant::bot(BOT_ID), Occupant::user(LISTENER)]).await
    }

    pub async fn start_with(occupants: Vec<Occupant>) -> Self {
        let engine = MockEngine::new();
        let transport = MockTransport::new();
        let presence = MockPresence::new();
        let surface = RecordingSurface::new();
        presence.set_occupants(CHANNEL, occupants);

        let bus = EventBus::new(100);
        let events = bus.subscribe();
        let config = JukeboxConfig::default();

        let response = ResponseLifecycle::defer(surface.clone()).await.unwrap();
        let session = SessionCoordinator::start(SessionParams {
            guild_id: GUILD,
            channel_id: CHANNEL,
            engine: engine.clone(),
            transport: transport.clone(),
            presence: presence.clone(),
            response,
            session_config: config.session.clone(),
            render_config: config.render.clone(),
            events: bus,
        })
        .await
        .unwrap();

        Self {
            session,
            engine,
            transport,
            presence,
            surface,
            events,
        }
    }
}

/// Track source backed by a fixed table; unknown identifiers match nothing
#[derive(Default)]
pub struct MockTrackSource {
    table: Mutex<HashMap<String, Vec<TrackInfo>>>,
    stall: Mutex<Option<Duration>>,
}

impl MockTrackSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, identifier: &str, titles: &[&str]) {
        let infos = titles
            .iter()
            .map(|title| TrackInfo {
                title: title.to_string(),
                uri: format!("https://example.com/{}", title),
                author: "tester".to_string(),
                duration_ms: 180_000,
            })
            .collect();
        self.table.lock().unwrap().insert(identifier.to_string(), infos);
    }

    /// Make every load hang for `delay`
    pub fn stall_for(&self, delay: Duration) {
        *self.stall.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl TrackSource for MockTrackSource {
    async fn load_item(&self, identifier: &str) -> Result<Vec<Track>, LoadError> {
        let stall = *self.stall.lock().unwrap();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }

        let infos = self
            .table
            .lock()
            .unwrap()
            .get(identifier)
            .cloned()
            .unwrap_or_default();
        Ok(infos.into_iter().map(Track::new).collect())
    }
}

/// Registry wired to recording collaborators
pub struct RegistryHarness {
    pub registry: SessionRegistry,
    pub players: Arc<MockPlayerFactory>,
    pub transport: Arc<MockTransport>,
    pub presence: Arc<MockPresence>,
    pub tracks: Arc<MockTrackSource>,
    pub surface: Arc<RecordingSurface>,
}

impl RegistryHarness {
    pub fn new() -> Self {
        let players = MockPlayerFactory::new();
        let transport = MockTransport::new();
        let presence = MockPresence::new();
        let tracks = MockTrackSource::new();
        let surface = RecordingSurface::new();

        for channel in [CHANNEL, OTHER_CHANNEL] {
            presence.set_occupants(channel, vec![Occupant::bot(BOT_ID), Occupant::user(LISTENER)]);
        }
        tracks.add("song", &["song"]);
        tracks.add("album", &["one", "two", "three"]);

        let registry = SessionRegistry::from_config(
            Collaborators {
                players: players.clone(),
                transport: transport.clone(),
                presence: presence.clone(),
                tracks: tracks.clone(),
            },
            JukeboxConfig::default(),
        );

        Self {
            registry,
            players,
            transport,
            presence,
            tracks,
            surface,
        }
    }

    pub async fn response(&self) -> ResponseLifecycle {
        ResponseLifecycle::defer(self.surface.clone()).await.unwrap()
    }
}
