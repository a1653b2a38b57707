use serde::{Deserialize, Serialize};

/// Reserved data-channel topic for agent side-channel events. Packets
/// on any other topic belong to unrelated subsystems and are ignored.
pub const AGENT_EVENTS_TOPIC: &str = "agent_events";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEventPayload {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub prompt: String,
}

/// Decoded agent event, wire shape `{ "type": ..., "data": ... }`.
/// Unrecognized `type` values decode to `Unknown` so future event
/// kinds never break current sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum AgentEvent {
    Image(ImageEventPayload),
    #[serde(other)]
    Unknown,
}
