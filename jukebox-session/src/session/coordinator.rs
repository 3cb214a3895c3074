//! Session actor: startup, command dispatch and teardown

use super::handle::SessionHandle;
use super::{render_loop, Command};
use crate::action::SessionAction;
use crate::engine::{AudioEngine, EngineEvent};
use crate::error::Result;
use crate::presence::{PresenceTracker, PresenceUpdate};
use crate::queue::PlaybackQueue;
use crate::render::render_panel;
use crate::response::{ResponseLifecycle, UpdateOutcome};
use crate::snapshot::PlaybackSnapshot;
use crate::transport::{PresenceEvent, PresenceSource, VoiceConnection, VoiceTransport};
use chrono::Utc;
use jukebox_common::config::{RenderConfig, SessionConfig};
use jukebox_common::events::{EventBus, SessionEvent, TeardownStep};
use jukebox_common::{ChannelId, GuildId, SessionId, Track};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Everything needed to start a session
pub struct SessionParams {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    /// Fresh player owned by this session from now on
    pub engine: Arc<dyn AudioEngine>,
    pub transport: Arc<dyn VoiceTransport>,
    pub presence: Arc<dyn PresenceSource>,
    /// Response the session renders into; usually still deferred
    pub response: ResponseLifecycle,
    pub session_config: SessionConfig,
    pub render_config: RenderConfig,
    pub events: EventBus,
}

/// Loop control returned by command handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Owner of one session's state; lives inside the actor task
pub struct SessionCoordinator {
    id: SessionId,
    guild_id: GuildId,
    channel_id: ChannelId,
    queue: PlaybackQueue,
    presence: PresenceTracker,
    response: ResponseLifecycle,
    connection: Box<dyn VoiceConnection>,
    render_config: RenderConfig,
    events: EventBus,
    /// Stops the render loop and event forwarders
    shutdown: CancellationToken,
    /// Fires once every resource is released
    done: CancellationToken,
}

impl SessionCoordinator {
    /// Connect to voice and spawn the session actor
    ///
    /// If the connection cannot be established the engine player is released
    /// and the response deleted (both best-effort) before the error is
    /// returned.
    pub async fn start(params: SessionParams) -> Result<SessionHandle> {
        let SessionParams {
            guild_id,
            channel_id,
            engine,
            transport,
            presence,
            mut response,
            session_config,
            render_config,
            events,
        } = params;

        let id = SessionId::new();

        let connection = match transport.connect(channel_id, engine.frames()).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!(guild_id = %guild_id, channel_id = %channel_id, error = %e, "Voice connection failed");
                if let Err(destroy_err) = engine.destroy().await {
                    warn!(error = %destroy_err, "Failed to release engine player after connect failure");
                }
                if let Err(delete_err) = response.delete().await {
                    warn!(error = %delete_err, "Failed to delete response after connect failure");
                }
                return Err(e.into());
            }
        };

        let occupants = match presence.occupants(channel_id).await {
            Ok(occupants) => occupants,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Occupant lookup failed, starting with no listeners");
                Vec::new()
            }
        };

        let tracker = PresenceTracker::new(
            channel_id,
            connection.self_id(),
            &occupants,
            session_config.disconnect_policy,
            session_config.exclude_bots,
        );
        let queue = PlaybackQueue::new(Arc::clone(&engine));

        let (commands, inbox) = mpsc::channel(session_config.command_capacity);
        let shutdown = CancellationToken::new();
        let done = CancellationToken::new();

        tokio::spawn(forward(
            engine.subscribe(),
            commands.clone(),
            shutdown.clone(),
            Command::Engine,
        ));
        tokio::spawn(forward(
            presence.subscribe(channel_id),
            commands.clone(),
            shutdown.clone(),
            Command::Presence,
        ));
        tokio::spawn(render_loop::run(
            queue.watch(),
            session_config.debounce(),
            commands.clone(),
            shutdown.clone(),
        ));

        info!(
            session_id = %id,
            guild_id = %guild_id,
            channel_id = %channel_id,
            listeners = tracker.len(),
            "Session started"
        );
        events.emit_lossy(SessionEvent::SessionStarted {
            session_id: id,
            guild_id,
            channel_id,
            listeners: tracker.len(),
            timestamp: Utc::now(),
        });

        let coordinator = SessionCoordinator {
            id,
            guild_id,
            channel_id,
            queue,
            presence: tracker,
            response,
            connection,
            render_config,
            events,
            shutdown,
            done: done.clone(),
        };
        tokio::spawn(coordinator.run(inbox));

        Ok(SessionHandle::new(id, guild_id, channel_id, commands, done))
    }

    async fn run(mut self, mut inbox: mpsc::Receiver<Command>) {
        while let Some(command) = inbox.recv().await {
            if self.handle_command(command).await == Flow::Stop {
                break;
            }
        }

        self.teardown().await;
    }

    async fn handle_command(&mut self, command: Command) -> Flow {
        match command {
            Command::Enqueue(track) => {
                self.enqueue(track).await;
                Flow::Continue
            }
            Command::Action { action, reply } => {
                let flow = self.apply_action(action).await;
                let _ = reply.send(true);
                flow
            }
            Command::Presence(event) => self.on_presence(event),
            Command::Engine(event) => {
                self.on_engine_event(event).await;
                Flow::Continue
            }
            Command::Render(snapshot) => {
                self.render(snapshot).await;
                Flow::Continue
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.queue.snapshot());
                Flow::Continue
            }
            Command::Disconnect => {
                info!(session_id = %self.id, "Disconnect requested");
                Flow::Stop
            }
        }
    }

    async fn enqueue(&mut self, track: Track) {
        let title = track.title().to_string();
        match self.queue.enqueue(track).await {
            Ok(outcome) => debug!(session_id = %self.id, track = %title, ?outcome, "Track enqueued"),
            Err(e) => warn!(session_id = %self.id, track = %title, error = %e, "Failed to enqueue track"),
        }
    }

    async fn apply_action(&mut self, action: SessionAction) -> Flow {
        debug!(session_id = %self.id, %action, "Applying panel action");

        let result = match action {
            SessionAction::Resume => self.queue.set_playing(true).await,
            SessionAction::Pause => self.queue.set_playing(false).await,
            SessionAction::Skip => self.queue.skip().await,
            SessionAction::Clear => {
                self.queue.clear();
                Ok(())
            }
            SessionAction::Leave => return Flow::Stop,
        };

        if let Err(e) = result {
            warn!(session_id = %self.id, %action, error = %e, "Panel action failed");
        }
        Flow::Continue
    }

    fn on_presence(&mut self, event: PresenceEvent) -> Flow {
        match self.presence.apply(&event) {
            PresenceUpdate::Ignored => Flow::Continue,
            PresenceUpdate::Applied {
                changed,
                listeners,
                should_disconnect,
            } => {
                if changed {
                    debug!(session_id = %self.id, user_id = %event.user_id, listeners, "Listener set changed");
                    self.events.emit_lossy(SessionEvent::ListenersChanged {
                        session_id: self.id,
                        listeners,
                        timestamp: Utc::now(),
                    });
                }

                if should_disconnect {
                    info!(session_id = %self.id, listeners, "Leaving voice channel after presence change");
                    Flow::Stop
                } else {
                    Flow::Continue
                }
            }
        }
    }

    async fn on_engine_event(&mut self, event: EngineEvent) {
        if let Err(e) = self.queue.handle_engine_event(event).await {
            warn!(session_id = %self.id, error = %e, "Failed to apply engine event");
        }
    }

    async fn render(&mut self, snapshot: PlaybackSnapshot) {
        let render_config = &self.render_config;
        let outcome = self
            .response
            .update(|| render_panel(&snapshot, render_config))
            .await;

        match outcome {
            Ok(UpdateOutcome::Materialized | UpdateOutcome::Edited) => {
                self.events.emit_lossy(SessionEvent::SnapshotRendered {
                    session_id: self.id,
                    is_playing: snapshot.is_playing,
                    current_title: snapshot.current.as_ref().map(|t| t.title().to_string()),
                    queue_len: snapshot.queue.len(),
                    timestamp: Utc::now(),
                });
            }
            Ok(UpdateOutcome::Gone) => {
                debug!(session_id = %self.id, "Response gone, further renders skipped");
            }
            Ok(UpdateOutcome::Skipped) => {}
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Failed to render session panel");
                self.events.emit_lossy(SessionEvent::RenderFailed {
                    session_id: self.id,
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
            }
        }
    }

    /// Release every resource, then fire the done marker
    ///
    /// Each step runs even if an earlier one failed.
    async fn teardown(mut self) {
        info!(session_id = %self.id, guild_id = %self.guild_id, "Tearing down session");
        self.shutdown.cancel();

        if let Err(e) = self.queue.close().await {
            self.step_failed(TeardownStep::CloseQueue, e.to_string());
        }
        if let Err(e) = self.response.delete().await {
            self.step_failed(TeardownStep::DeleteResponse, e.to_string());
        }
        if let Err(e) = self.connection.shutdown().await {
            self.step_failed(TeardownStep::ShutdownConnection, e.to_string());
        }

        self.events.emit_lossy(SessionEvent::SessionEnded {
            session_id: self.id,
            guild_id: self.guild_id,
            timestamp: Utc::now(),
        });
        info!(session_id = %self.id, channel_id = %self.channel_id, "Session ended");

        self.done.cancel();
    }

    fn step_failed(&self, step: TeardownStep, error: String) {
        warn!(session_id = %self.id, %step, error = %error, "Teardown step failed");
        self.events.emit_lossy(SessionEvent::TeardownStepFailed {
            session_id: self.id,
            step,
            error,
            timestamp: Utc::now(),
        });
    }
}

/// Pump a collaborator's event stream into the actor's command channel
async fn forward<T>(
    mut events: mpsc::UnboundedReceiver<T>,
    commands: mpsc::Sender<Command>,
    shutdown: CancellationToken,
    wrap: fn(T) -> Command,
) {
    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            event = events.recv() => match event {
                Some(event) => event,
                None => break,
            },
        };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            sent = commands.send(wrap(event)) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}
