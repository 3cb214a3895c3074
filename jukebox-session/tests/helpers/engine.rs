//! Scriptable in-memory audio engine

use async_trait::async_trait;
use jukebox_common::Track;
use jukebox_session::engine::{
    AudioEngine, EngineError, EngineEvent, FrameProvider, PlayerFactory,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Call received by a [`MockEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Play(String),
    SetPaused(bool),
    Stop,
    Destroy,
}

struct Silence;

impl FrameProvider for Silence {
    fn provide(&self) -> Option<Vec<u8>> {
        None
    }
}

#[derive(Default)]
struct EngineState {
    playing: Option<Track>,
    calls: Vec<EngineCall>,
    subscriber: Option<mpsc::UnboundedSender<EngineEvent>>,
    fail_destroy: bool,
}

/// Engine that records calls and only emits events when the test says so
///
/// `play` makes the track the engine's active track, like a real engine
/// would, but the matching `TrackStarted` event is left to the test.
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<EngineState>,
}

impl MockEngine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Deliver an engine callback to the session
    pub fn emit(&self, event: EngineEvent) {
        if let Some(subscriber) = &self.state.lock().unwrap().subscriber {
            let _ = subscriber.send(event);
        }
    }

    pub fn fail_destroy(&self) {
        self.state.lock().unwrap().fail_destroy = true;
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Titles passed to `play`, in order
    pub fn plays(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Play(title) => Some(title),
                _ => None,
            })
            .collect()
    }

    pub fn destroy_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == EngineCall::Destroy)
            .count()
    }
}

#[async_trait]
impl AudioEngine for MockEngine {
    fn playing_track(&self) -> Option<Track> {
        self.state.lock().unwrap().playing.clone()
    }

    async fn play(&self, track: Track) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Play(track.title().to_string()));
        state.playing = Some(track);
        Ok(())
    }

    async fn set_paused(&self, paused: bool) -> Result<(), EngineError> {
        self.state.lock().unwrap().calls.push(EngineCall::SetPaused(paused));
        Ok(())
    }

    async fn stop(&self) -> Result<(), EngineError> {
        self.state.lock().unwrap().calls.push(EngineCall::Stop);
        Ok(())
    }

    async fn destroy(&self) -> Result<(), EngineError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(EngineCall::Destroy);
        state.playing = None;
        state.subscriber = None;
        if state.fail_destroy {
            return Err(EngineError::new("player already released"));
        }
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<EngineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().unwrap().subscriber = Some(tx);
        rx
    }

    fn frames(&self) -> Arc<dyn FrameProvider> {
        Arc::new(Silence)
    }
}

/// Factory handing out [`MockEngine`]s and remembering each one
#[derive(Default)]
pub struct MockPlayerFactory {
    players: Mutex<Vec<Arc<MockEngine>>>,
}

impl MockPlayerFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.players.lock().unwrap().len()
    }

    pub fn player(&self, index: usize) -> Arc<MockEngine> {
        Arc::clone(&self.players.lock().unwrap()[index])
    }
}

impl PlayerFactory for MockPlayerFactory {
    fn create_player(&self) -> Arc<dyn AudioEngine> {
        let engine = MockEngine::new();
        self.players.lock().unwrap().push(Arc::clone(&engine));
        engine
    }
}
