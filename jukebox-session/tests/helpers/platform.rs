//! In-memory voice transport, presence source and response surface

use async_trait::async_trait;
use jukebox_common::{ChannelId, UserId};
use jukebox_session::engine::FrameProvider;
use jukebox_session::render::RenderedPanel;
use jukebox_session::surface::{ResponseHandle, ResponseSurface, SurfaceError};
use jukebox_session::transport::{
    Occupant, PresenceEvent, PresenceSource, TransportError, VoiceConnection, VoiceTransport,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Identity every mock connection speaks as
pub const BOT_ID: UserId = UserId(1);

#[derive(Default)]
pub struct MockTransport {
    connects: Mutex<Vec<ChannelId>>,
    shutdowns: Arc<AtomicUsize>,
    fail_connect: Mutex<bool>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_connect(&self) {
        *self.fail_connect.lock().unwrap() = true;
    }

    pub fn connects(&self) -> Vec<ChannelId> {
        self.connects.lock().unwrap().clone()
    }

    /// Total shutdowns across every connection handed out
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

struct MockConnection {
    shutdowns: Arc<AtomicUsize>,
}

#[async_trait]
impl VoiceConnection for MockConnection {
    fn self_id(&self) -> UserId {
        BOT_ID
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl VoiceTransport for MockTransport {
    async fn connect(
        &self,
        channel: ChannelId,
        _frames: Arc<dyn FrameProvider>,
    ) -> Result<Box<dyn VoiceConnection>, TransportError> {
        if *self.fail_connect.lock().unwrap() {
            return Err(TransportError::Connect("missing permissions".into()));
        }
        self.connects.lock().unwrap().push(channel);
        Ok(Box::new(MockConnection {
            shutdowns: Arc::clone(&self.shutdowns),
        }))
    }
}

/// Presence source with scripted occupants and manual event delivery
#[derive(Default)]
pub struct MockPresence {
    occupants: Mutex<HashMap<ChannelId, Vec<Occupant>>>,
    subscribers: Mutex<HashMap<ChannelId, Vec<mpsc::UnboundedSender<PresenceEvent>>>>,
    fail_lookup: Mutex<bool>,
}

impl MockPresence {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_occupants(&self, channel: ChannelId, occupants: Vec<Occupant>) {
        self.occupants.lock().unwrap().insert(channel, occupants);
    }

    pub fn fail_lookup(&self) {
        *self.fail_lookup.lock().unwrap() = true;
    }

    /// Deliver `event` to every session watching `channel`
    pub fn emit(&self, channel: ChannelId, event: PresenceEvent) {
        if let Some(subscribers) = self.subscribers.lock().unwrap().get(&channel) {
            for subscriber in subscribers {
                let _ = subscriber.send(event);
            }
        }
    }
}

#[async_trait]
impl PresenceSource for MockPresence {
    async fn occupants(&self, channel: ChannelId) -> Result<Vec<Occupant>, TransportError> {
        if *self.fail_lookup.lock().unwrap() {
            return Err(TransportError::Presence("gateway cache unavailable".into()));
        }
        Ok(self
            .occupants
            .lock()
            .unwrap()
            .get(&channel)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe(&self, channel: ChannelId) -> mpsc::UnboundedReceiver<PresenceEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap()
            .entry(channel)
            .or_default()
            .push(tx);
        rx
    }
}

/// Call received by a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Defer(ResponseHandle),
    Respond(ResponseHandle, RenderedPanel),
    Edit(ResponseHandle, RenderedPanel),
    Delete(ResponseHandle),
}

/// Surface that records every call and fails calls on demand
#[derive(Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<SurfaceCall>>,
    failures: Mutex<VecDeque<SurfaceError>>,
    next_id: AtomicUsize,
}

impl RecordingSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Fail the next respond/edit/delete with `error`
    pub fn fail_next(&self, error: SurfaceError) {
        self.failures.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Panels that reached the surface, successful or not
    pub fn renders(&self) -> Vec<RenderedPanel> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Respond(_, panel) | SurfaceCall::Edit(_, panel) => Some(panel),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<ResponseHandle> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                SurfaceCall::Delete(handle) => Some(handle),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: SurfaceCall) -> Result<(), SurfaceError> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResponseSurface for RecordingSurface {
    async fn create_deferred(&self) -> Result<ResponseHandle, SurfaceError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = ResponseHandle::new(format!("deferred-{}", id));
        self.calls.lock().unwrap().push(SurfaceCall::Defer(handle.clone()));
        Ok(handle)
    }

    async fn respond(
        &self,
        handle: &ResponseHandle,
        panel: &RenderedPanel,
    ) -> Result<ResponseHandle, SurfaceError> {
        self.record(SurfaceCall::Respond(handle.clone(), panel.clone()))?;
        Ok(ResponseHandle::new(format!("message-{}", handle)))
    }

    async fn edit(
        &self,
        handle: &ResponseHandle,
        panel: &RenderedPanel,
    ) -> Result<ResponseHandle, SurfaceError> {
        self.record(SurfaceCall::Edit(handle.clone(), panel.clone()))?;
        Ok(handle.clone())
    }

    async fn delete(&self, handle: &ResponseHandle) -> Result<(), SurfaceError> {
        self.record(SurfaceCall::Delete(handle.clone()))
    }
}
