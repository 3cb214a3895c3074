//! # Jukebox Common Library
//!
//! Shared vocabulary for the jukebox crates:
//! - Identifier newtypes (guild, channel, user, session, track)
//! - Track handles and requester stamps
//! - Session lifecycle events and the broadcast EventBus
//! - Configuration loading and tracing setup
//! - Human-readable durations

pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod ids;
pub mod logging;
pub mod track;

pub use error::{Error, Result};
pub use ids::{ChannelId, GuildId, SessionId, TrackId, UserId};
pub use track::{Requester, Track, TrackInfo};
