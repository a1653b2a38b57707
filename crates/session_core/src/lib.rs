use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use room_integration::{
    DataPacket, RoomConnectOptions, RoomConnector, RoomSession, RoomSessionEvent,
    TranscriptionSegment,
};
use shared::config::AppConfig;
use shared::domain::{ChatMessage, ControlCapabilities, GeneratedImage, SessionPhase};
use shared::protocol::AgentEvent;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

mod channel;
mod router;
mod timeout;
mod transcript;

pub use timeout::{TimeoutHandle, TimeoutSupervisor};
pub use transcript::{TranscriptAggregator, TranscriptEntry, TranscriptUpdate};

/// Default cap on one session, connect phase included. The timer is
/// not re-armed when the session becomes active, so this bounds the
/// whole conversation.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(200_000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub room_name: String,
    pub token: String,
    pub session_timeout: Duration,
}

impl SessionOptions {
    pub fn new(room_name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            room_name: room_name.into(),
            token: token.into(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect room: {0}")]
    Connect(String),
    #[error("session was never started")]
    NotStarted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged(SessionPhase),
    TranscriptUpdated { autoscroll: bool },
    ImageUpdated(Option<GeneratedImage>),
    ChatOpenChanged(bool),
}

pub struct MissingRoomConnector;

#[async_trait]
impl RoomConnector for MissingRoomConnector {
    async fn connect(
        &self,
        _options: RoomConnectOptions,
    ) -> anyhow::Result<Arc<dyn RoomSession>> {
        Err(anyhow!("room connector is unavailable"))
    }
}

struct ActiveSession {
    room: Arc<dyn RoomSession>,
    event_task: JoinHandle<()>,
    data_task: JoinHandle<()>,
    timeout: TimeoutHandle,
}

struct ControllerState {
    phase: SessionPhase,
    chat_open: bool,
    generation: u64,
    options: Option<SessionOptions>,
    transcript: TranscriptAggregator,
    generated_image: Option<GeneratedImage>,
    capabilities: ControlCapabilities,
}

/// Top-level session state machine. Owns the phase, the transcript,
/// the overlay slot and the per-session transport resources; every
/// mutation happens under `inner` together with its generation check,
/// so a handler from a torn-down session can never write into a fresh
/// one.
pub struct SessionController {
    config: AppConfig,
    connector: Arc<dyn RoomConnector>,
    inner: Mutex<ControllerState>,
    active: Mutex<Option<ActiveSession>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(config: AppConfig) -> Arc<Self> {
        Self::new_with_connector(config, Arc::new(MissingRoomConnector))
    }

    pub fn new_with_connector(config: AppConfig, connector: Arc<dyn RoomConnector>) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        let capabilities = derive_controls(&config);
        Arc::new(Self {
            config,
            connector,
            inner: Mutex::new(ControllerState {
                phase: SessionPhase::Connecting,
                chat_open: false,
                generation: 0,
                options: None,
                transcript: TranscriptAggregator::default(),
                generated_image: None,
                capabilities,
            }),
            active: Mutex::new(None),
            events,
        })
    }

    /// Enters a fresh session: resets all session-scoped state under
    /// one lock (bumping the generation), tears down any previous
    /// transport, arms the timeout, then connects and subscribes.
    pub async fn start(self: &Arc<Self>, options: SessionOptions) -> Result<(), SessionError> {
        let generation = {
            let mut inner = self.inner.lock().await;
            inner.generation += 1;
            inner.phase = SessionPhase::Connecting;
            inner.transcript.clear();
            inner.generated_image = None;
            inner.capabilities = derive_controls(&self.config);
            inner.options = Some(options.clone());
            inner.generation
        };

        self.teardown_transport().await;
        self.emit(SessionEvent::PhaseChanged(SessionPhase::Connecting));

        // The countdown starts at session entry, so connect
        // negotiation is bounded too: a transport that hangs or errors
        // still ends in `TimedOut`.
        let controller = Arc::clone(self);
        let timeout = TimeoutSupervisor::start(options.session_timeout, async move {
            controller.on_timeout(generation).await;
        });

        let room = self
            .connector
            .connect(RoomConnectOptions {
                room_name: options.room_name.clone(),
                token: options.token.clone(),
                agent_name: self.config.agent_name.clone(),
                enable_pre_connect_buffer: self.config.is_pre_connect_buffer_enabled,
            })
            .await
            .map_err(|err| SessionError::Connect(err.to_string()))?;

        // The timer may have fired, or a newer start may have taken
        // over, while connect was in flight.
        let stale = {
            let inner = self.inner.lock().await;
            inner.generation != generation || inner.phase != SessionPhase::Connecting
        };
        if stale {
            timeout.cancel();
            if let Err(err) = room.leave().await {
                warn!(error = %err, "failed to leave room that connected past its deadline");
            }
            return Err(SessionError::Connect(
                "session ended before connect completed".to_string(),
            ));
        }

        // Acquire both subscriptions before any task runs so nothing
        // delivered after connect can slip past the listeners.
        let room_events = room.subscribe_events();
        let packets = room.subscribe_data();

        let event_task = self.spawn_room_event_task(generation, room_events);
        let data_task = self.spawn_data_task(generation, packets);

        *self.active.lock().await = Some(ActiveSession {
            room,
            event_task,
            data_task,
            timeout,
        });

        info!(room = %options.room_name, "session connecting");
        Ok(())
    }

    /// Full teardown and reinitialization with the options from the
    /// previous `start`. The old session's listeners and timer are
    /// gone, and its overlay and transcript cleared, before the new
    /// subscription exists.
    pub async fn restart(self: &Arc<Self>) -> Result<(), SessionError> {
        let options = {
            let mut inner = self.inner.lock().await;
            let Some(options) = inner.options.clone() else {
                return Err(SessionError::NotStarted);
            };
            inner.phase = SessionPhase::Restarting;
            options
        };
        self.emit(SessionEvent::PhaseChanged(SessionPhase::Restarting));
        info!("restarting session");
        self.start(options).await
    }

    pub async fn set_chat_open(&self, open: bool) {
        let changed = {
            let mut inner = self.inner.lock().await;
            if inner.chat_open == open {
                false
            } else {
                inner.chat_open = open;
                true
            }
        };
        if changed {
            self.emit(SessionEvent::ChatOpenChanged(open));
        }
    }

    /// User dismissal of the image overlay.
    pub async fn dismiss_image(&self) {
        let cleared = self.inner.lock().await.generated_image.take().is_some();
        if cleared {
            self.emit(SessionEvent::ImageUpdated(None));
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn phase(&self) -> SessionPhase {
        self.inner.lock().await.phase
    }

    pub async fn chat_open(&self) -> bool {
        self.inner.lock().await.chat_open
    }

    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.inner.lock().await.transcript.entries().to_vec()
    }

    pub async fn generated_image(&self) -> Option<GeneratedImage> {
        self.inner.lock().await.generated_image.clone()
    }

    pub async fn capabilities(&self) -> ControlCapabilities {
        self.inner.lock().await.capabilities
    }

    async fn teardown_transport(&self) {
        let previous = self.active.lock().await.take();
        if let Some(active) = previous {
            active.event_task.abort();
            active.data_task.abort();
            active.timeout.cancel();
            if let Err(err) = active.room.leave().await {
                warn!(error = %err, "failed to leave room during teardown");
            }
        }
    }

    fn spawn_room_event_task(
        self: &Arc<Self>,
        generation: u64,
        mut room_events: broadcast::Receiver<RoomSessionEvent>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Ok(event) = room_events.recv().await {
                match event {
                    RoomSessionEvent::Connected => controller.on_room_ready(generation).await,
                    RoomSessionEvent::TranscriptionReceived(segment) => {
                        controller.on_transcription(generation, segment).await
                    }
                    RoomSessionEvent::Disconnected { reason } => {
                        info!(reason = %reason, "room disconnected; transport owns reconnection");
                    }
                }
            }
        })
    }

    fn spawn_data_task(
        self: &Arc<Self>,
        generation: u64,
        mut packets: broadcast::Receiver<DataPacket>,
    ) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            while let Ok(packet) = packets.recv().await {
                let Some(event) = channel::decode_agent_packet(&packet) else {
                    continue;
                };
                controller.on_agent_event(generation, event).await;
            }
        })
    }

    async fn on_room_ready(&self, generation: u64) {
        let activated = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation || inner.phase != SessionPhase::Connecting {
                false
            } else {
                inner.phase = SessionPhase::Active;
                inner.transcript.mark_delivered();
                true
            }
        };
        if activated {
            // The session timer keeps running: it caps the whole
            // session, not just the connect phase.
            self.emit(SessionEvent::PhaseChanged(SessionPhase::Active));
            info!("session active");
        }
    }

    async fn on_transcription(&self, generation: u64, segment: TranscriptionSegment) {
        let update = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                return;
            }
            let buffered = segment.origin.is_local()
                && inner.phase != SessionPhase::Active
                && self.config.is_pre_connect_buffer_enabled;
            inner.transcript.apply(
                ChatMessage {
                    id: segment.id,
                    origin: segment.origin,
                    text: segment.text,
                    created_at: segment.received_at,
                    edited: false,
                },
                buffered,
            )
        };
        match update {
            TranscriptUpdate::Appended { autoscroll } => {
                self.emit(SessionEvent::TranscriptUpdated { autoscroll })
            }
            TranscriptUpdate::Edited => {
                self.emit(SessionEvent::TranscriptUpdated { autoscroll: false })
            }
            TranscriptUpdate::Unchanged => {}
        }
    }

    async fn on_agent_event(&self, generation: u64, event: AgentEvent) {
        let image = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation {
                return;
            }
            if !router::route_agent_event(event, &mut inner.generated_image) {
                return;
            }
            inner.generated_image.clone()
        };
        self.emit(SessionEvent::ImageUpdated(image));
    }

    async fn on_timeout(self: Arc<Self>, generation: u64) {
        let timed_out = {
            let mut inner = self.inner.lock().await;
            if inner.generation != generation
                || !matches!(inner.phase, SessionPhase::Connecting | SessionPhase::Active)
            {
                false
            } else {
                inner.phase = SessionPhase::TimedOut;
                true
            }
        };
        if !timed_out {
            return;
        }
        self.emit(SessionEvent::PhaseChanged(SessionPhase::TimedOut));
        info!("session timed out");

        // Terminal for this session instance: release the transport
        // but keep transcript and overlay visible for the
        // session-ended view.
        let active = self.active.lock().await.take();
        if let Some(active) = active {
            active.event_task.abort();
            active.data_task.abort();
            if let Err(err) = active.room.leave().await {
                warn!(error = %err, "failed to leave room after timeout");
            }
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

fn derive_controls(config: &AppConfig) -> ControlCapabilities {
    ControlCapabilities {
        leave: true,
        microphone: true,
        chat: config.supports_chat_input,
        camera: config.supports_video_input,
        // screen share is gated on video input support, not on
        // `supports_screen_share`
        screen_share: config.supports_video_input,
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
