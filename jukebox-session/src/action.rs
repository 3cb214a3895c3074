//! Panel actions
//!
//! The rendered panel offers buttons built from this enum, and incoming
//! button presses are parsed back through it, so the two can never drift.

use serde::{Deserialize, Serialize};

/// Controls offered on the session panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionAction {
    Resume,
    Pause,
    Skip,
    Clear,
    Leave,
}

impl SessionAction {
    pub const ALL: [SessionAction; 5] = [
        SessionAction::Resume,
        SessionAction::Pause,
        SessionAction::Skip,
        SessionAction::Clear,
        SessionAction::Leave,
    ];

    /// Wire identifier carried by the button
    pub fn id(self) -> &'static str {
        match self {
            SessionAction::Resume => "resume",
            SessionAction::Pause => "pause",
            SessionAction::Skip => "skip",
            SessionAction::Clear => "clear",
            SessionAction::Leave => "leave",
        }
    }

    /// Parse a wire identifier; unknown ids yield `None`
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }
}

impl std::fmt::Display for SessionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
