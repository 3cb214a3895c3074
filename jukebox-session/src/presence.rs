//! Listener tracking for one voice channel

use crate::transport::{Occupant, PresenceEvent};
use jukebox_common::config::DisconnectPolicy;
use jukebox_common::{ChannelId, UserId};
use std::collections::HashSet;

/// Outcome of applying one presence event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenceUpdate {
    /// Event concerns the session's own identity or an excluded bot
    Ignored,
    Applied {
        /// Whether the listener set actually changed
        changed: bool,
        listeners: usize,
        should_disconnect: bool,
    },
}

impl PresenceUpdate {
    pub fn should_disconnect(&self) -> bool {
        matches!(
            self,
            PresenceUpdate::Applied {
                should_disconnect: true,
                ..
            }
        )
    }
}

#[derive(Debug, Clone)]
pub struct PresenceTracker {
    channel_id: ChannelId,
    self_id: UserId,
    listeners: HashSet<UserId>,
    policy: DisconnectPolicy,
    exclude_bots: bool,
}

impl PresenceTracker {
    /// Seed the listener set from the channel's occupants at connect time
    pub fn new(
        channel_id: ChannelId,
        self_id: UserId,
        occupants: &[Occupant],
        policy: DisconnectPolicy,
        exclude_bots: bool,
    ) -> Self {
        let listeners = occupants
            .iter()
            .filter(|o| o.user_id != self_id && !(exclude_bots && o.is_bot))
            .map(|o| o.user_id)
            .collect();

        Self {
            channel_id,
            self_id,
            listeners,
            policy,
            exclude_bots,
        }
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn listeners(&self) -> &HashSet<UserId> {
        &self.listeners
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Add the user if they are now in this channel, remove them otherwise
    pub fn apply(&mut self, event: &PresenceEvent) -> PresenceUpdate {
        if event.user_id == self.self_id || (self.exclude_bots && event.is_bot) {
            return PresenceUpdate::Ignored;
        }

        let changed = if event.channel_id == Some(self.channel_id) {
            self.listeners.insert(event.user_id)
        } else {
            self.listeners.remove(&event.user_id)
        };

        let should_disconnect = match self.policy {
            DisconnectPolicy::WhenEmpty => self.listeners.is_empty(),
            DisconnectPolicy::OnAnyChange => true,
        };

        PresenceUpdate::Applied {
            changed,
            listeners: self.listeners.len(),
            should_disconnect,
        }
    }
}
