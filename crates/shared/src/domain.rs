use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageOrigin {
    Local,
    Remote,
}

impl MessageOrigin {
    pub fn is_local(self) -> bool {
        matches!(self, MessageOrigin::Local)
    }
}

/// One entry of the session transcript. `id` is stable across
/// corrections; ordering is arrival order, not `created_at` order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub origin: MessageOrigin,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
}

/// Overlay state produced by the most recent valid image event.
/// At most one is active; a new event replaces the prior one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Connecting,
    Active,
    TimedOut,
    Restarting,
}

/// Control-bar capability flags, computed once per session from the
/// app config and never recomputed mid-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlCapabilities {
    pub leave: bool,
    pub microphone: bool,
    pub chat: bool,
    pub camera: bool,
    pub screen_share: bool,
}
