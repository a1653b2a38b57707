//! Scripted room backend for headless demo runs: plays a short
//! shopping conversation over the same traits a real transport
//! implements.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use room_integration::{
    DataPacket, RoomConnectOptions, RoomConnector, RoomSession, RoomSessionEvent,
    TranscriptionSegment,
};
use shared::domain::MessageOrigin;
use shared::protocol::AGENT_EVENTS_TOPIC;
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

pub struct ScriptedConnector;

#[async_trait]
impl RoomConnector for ScriptedConnector {
    async fn connect(
        &self,
        options: RoomConnectOptions,
    ) -> anyhow::Result<Arc<dyn RoomSession>> {
        info!(room = %options.room_name, agent = ?options.agent_name, "scripted room connected");
        let room = Arc::new(ScriptedRoom {
            events_tx: broadcast::channel(64).0,
            data_tx: broadcast::channel(64).0,
        });
        Arc::clone(&room).spawn_script();
        Ok(room)
    }
}

pub struct ScriptedRoom {
    events_tx: broadcast::Sender<RoomSessionEvent>,
    data_tx: broadcast::Sender<DataPacket>,
}

#[async_trait]
impl RoomSession for ScriptedRoom {
    fn subscribe_events(&self) -> broadcast::Receiver<RoomSessionEvent> {
        self.events_tx.subscribe()
    }

    fn subscribe_data(&self) -> broadcast::Receiver<DataPacket> {
        self.data_tx.subscribe()
    }

    async fn leave(&self) -> anyhow::Result<()> {
        info!("scripted room left");
        Ok(())
    }
}

impl ScriptedRoom {
    fn segment(&self, id: &str, origin: MessageOrigin, text: &str) {
        let _ = self
            .events_tx
            .send(RoomSessionEvent::TranscriptionReceived(TranscriptionSegment {
                id: id.to_string(),
                origin,
                text: text.to_string(),
                received_at: Utc::now(),
            }));
    }

    fn spawn_script(self: Arc<Self>) {
        tokio::spawn(async move {
            // The user speaks before the room is ready, exercising the
            // pre-connect buffer path.
            let user_turn = Uuid::new_v4().to_string();
            tokio::time::sleep(Duration::from_millis(200)).await;
            self.segment(&user_turn, MessageOrigin::Local, "I need mil");

            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = self.events_tx.send(RoomSessionEvent::Connected);

            tokio::time::sleep(Duration::from_millis(300)).await;
            self.segment(
                &Uuid::new_v4().to_string(),
                MessageOrigin::Remote,
                "Hi! I'm NOVA, your quantum shopping assistant. What groceries do you need today?",
            );

            // Transcription correction for the earlier turn.
            tokio::time::sleep(Duration::from_millis(300)).await;
            self.segment(&user_turn, MessageOrigin::Local, "I need milk");

            tokio::time::sleep(Duration::from_millis(400)).await;
            self.segment(
                &Uuid::new_v4().to_string(),
                MessageOrigin::Remote,
                "Found Fresh Milk 1L for \u{20b9}60. Shall I beam it into your cart?",
            );

            tokio::time::sleep(Duration::from_millis(400)).await;
            let _ = self.data_tx.send(DataPacket {
                topic: AGENT_EVENTS_TOPIC.to_string(),
                payload: br#"{"type":"image","data":{"url":"https://cdn.example/images/milk-1l.png","prompt":"fresh milk 1 liter"}}"#
                    .to_vec(),
                participant_identity: Some("nova-agent".to_string()),
            });

            tokio::time::sleep(Duration::from_millis(500)).await;
            let _ = self.events_tx.send(RoomSessionEvent::Disconnected {
                reason: "script complete".to_string(),
            });
        });
    }
}
