use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::domain::MessageOrigin;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConnectOptions {
    pub room_name: String,
    pub token: String,
    pub agent_name: Option<String>,
    pub enable_pre_connect_buffer: bool,
}

/// Raw delivery from the room's generic data stream. Every subsystem
/// sharing the transport multiplexes over `topic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    pub topic: String,
    pub payload: Vec<u8>,
    pub participant_identity: Option<String>,
}

/// One transcription record. A later segment with the same `id` is a
/// correction of the earlier text, not a new message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionSegment {
    pub id: String,
    pub origin: MessageOrigin,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomSessionEvent {
    Connected,
    Disconnected { reason: String },
    TranscriptionReceived(TranscriptionSegment),
}

#[async_trait]
pub trait RoomSession: Send + Sync {
    fn subscribe_events(&self) -> broadcast::Receiver<RoomSessionEvent>;
    fn subscribe_data(&self) -> broadcast::Receiver<DataPacket>;
    async fn leave(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait RoomConnector: Send + Sync {
    async fn connect(
        &self,
        options: RoomConnectOptions,
    ) -> anyhow::Result<std::sync::Arc<dyn RoomSession>>;
}
