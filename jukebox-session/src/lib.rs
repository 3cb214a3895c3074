//! # Jukebox Session
//!
//! Coordinates interactive playback sessions, one per voice channel:
//!
//! - [`PlaybackQueue`] keeps pending tracks in step with the audio engine
//! - [`ResponseLifecycle`] drives the remote panel through deferred, active
//!   and deleted states
//! - [`PresenceTracker`] follows who is still listening
//! - [`SessionCoordinator`] ties them together in one actor task with a
//!   debounced render loop and an idempotent teardown
//! - [`SessionRegistry`] keeps at most one session per guild
//!
//! Audio decoding, voice transport and the chat platform itself stay behind
//! the traits in [`engine`], [`transport`], [`surface`] and [`loader`].

pub mod action;
pub mod engine;
pub mod error;
pub mod loader;
pub mod presence;
pub mod queue;
pub mod registry;
pub mod render;
pub mod response;
pub mod session;
pub mod snapshot;
pub mod surface;
pub mod transport;

pub use action::SessionAction;
pub use error::{Error, Result};
pub use presence::PresenceTracker;
pub use queue::PlaybackQueue;
pub use registry::{Collaborators, PlayOutcome, PlayRequest, SessionRegistry};
pub use render::{render_panel, RenderedPanel};
pub use response::{ResponseLifecycle, ResponseState};
pub use session::{SessionCoordinator, SessionHandle, SessionParams};
pub use snapshot::PlaybackSnapshot;
