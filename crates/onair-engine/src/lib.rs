//! LiveKit-backed implementation of the core engine contract.
//!
//! Translates the abstract configure/join/leave surface into LiveKit room
//! operations and maps room events onto the engine event stream the
//! session controller consumes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use livekit::prelude::{Room, RoomEvent, RoomOptions};
use livekit::webrtc::video_source::native::NativeVideoSource;
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use onair_core::engine::{
    ChannelProfile, ClientRole, EngineError, EngineEvent, OFFLINE_REASON_QUIT, PeerId, RtcEngine,
};

mod directory;
mod media;

pub use directory::PeerDirectory;

/// Connection settings for the LiveKit backend.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// WebSocket endpoint of the LiveKit server (wss://).
    pub server_url: String,
}

/// One engine handle, created during session init and reused across
/// joins. The room connection itself lives only while in a channel.
pub struct LiveKitEngine {
    settings: EngineSettings,
    app_id: String,
    tx: UnboundedSender<EngineEvent>,
    room: Mutex<Option<Arc<Room>>>,
    video_enabled: AtomicBool,
    preview: Mutex<Option<NativeVideoSource>>,
    role: Mutex<ClientRole>,
}

impl LiveKitEngine {
    /// The local preview source. Platform capture feeds frames into it.
    pub async fn local_video_source(&self) -> Option<NativeVideoSource> {
        self.preview.lock().await.clone()
    }

    pub fn application_id(&self) -> &str {
        &self.app_id
    }
}

impl RtcEngine for LiveKitEngine {
    type Settings = EngineSettings;

    async fn create(
        settings: &EngineSettings,
        app_id: &str,
    ) -> Result<(Self, UnboundedReceiver<EngineEvent>), EngineError> {
        if settings.server_url.is_empty() {
            return Err(EngineError::Create("server_url is empty".into()));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = Self {
            settings: settings.clone(),
            app_id: app_id.to_string(),
            tx,
            room: Mutex::new(None),
            video_enabled: AtomicBool::new(false),
            preview: Mutex::new(None),
            role: Mutex::new(ClientRole::Audience),
        };
        tracing::info!(app_id, "engine created");
        Ok((engine, rx))
    }

    async fn enable_video_capture(&self) -> Result<(), EngineError> {
        self.video_enabled.store(true, Ordering::SeqCst);
        tracing::info!("video capture enabled");
        Ok(())
    }

    async fn start_local_preview(&self) -> Result<(), EngineError> {
        if !self.video_enabled.load(Ordering::SeqCst) {
            return Err(EngineError::Configure(
                "video capture must be enabled before starting the preview".into(),
            ));
        }
        *self.preview.lock().await = Some(media::create_preview_source());
        tracing::info!("local preview started");
        Ok(())
    }

    async fn set_channel_profile(&self, profile: ChannelProfile) -> Result<(), EngineError> {
        // Both profiles ride the same room mechanics here; the profile
        // only decides defaults the role doesn't override.
        tracing::info!(?profile, "channel profile set");
        Ok(())
    }

    async fn set_local_role(&self, role: ClientRole) -> Result<(), EngineError> {
        *self.role.lock().await = role;
        tracing::info!(?role, "local role set");
        Ok(())
    }

    async fn join_channel(
        &self,
        token: &str,
        channel: &str,
        info: Option<&str>,
        uid: PeerId,
    ) -> Result<(), EngineError> {
        if self.room.lock().await.is_some() {
            return Err(EngineError::Join("already in a channel".into()));
        }
        if let Some(info) = info {
            tracing::debug!(info, "optional join info ignored by this backend");
        }

        let mut options = RoomOptions::default();
        options.auto_subscribe = true;

        let started = Instant::now();
        let (room, room_events) = Room::connect(&self.settings.server_url, token, options)
            .await
            .map_err(|e| EngineError::Join(e.to_string()))?;
        let room = Arc::new(room);

        let mut directory = PeerDirectory::new();
        let local_uid = if uid != 0 {
            uid
        } else {
            directory.uid_for(&room.local_participant().identity().to_string())
        };

        *self.room.lock().await = Some(room.clone());

        if *self.role.lock().await == ClientRole::Broadcaster
            && self.video_enabled.load(Ordering::SeqCst)
        {
            if let Some(source) = self.preview.lock().await.clone() {
                media::publish_camera(&room, source).await?;
            }
        }

        let _ = self.tx.send(EngineEvent::JoinChannelSuccess {
            channel: channel.to_string(),
            uid: local_uid,
            elapsed_ms: started.elapsed().as_millis() as u64,
        });

        // Peers already in the channel surface as joins right away.
        for (_, participant) in room.remote_participants() {
            let uid = directory.uid_for(&participant.identity().to_string());
            let _ = self.tx.send(EngineEvent::UserJoined {
                uid,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }

        let tx = self.tx.clone();
        tokio::spawn(async move {
            map_room_events(room_events, tx, directory, started).await;
        });

        tracing::info!(channel, uid = local_uid, "joined channel");
        Ok(())
    }

    async fn leave_channel(&self) -> Result<(), EngineError> {
        let room = self.room.lock().await.take();
        let Some(room) = room else {
            tracing::debug!("leave requested with no active channel");
            return Ok(());
        };
        room.close()
            .await
            .map_err(|e| EngineError::Leave(e.to_string()))?;
        tracing::info!("left channel");
        Ok(())
    }
}

async fn map_room_events(
    mut events: UnboundedReceiver<RoomEvent>,
    tx: UnboundedSender<EngineEvent>,
    mut directory: PeerDirectory,
    started: Instant,
) {
    while let Some(event) = events.recv().await {
        match event {
            RoomEvent::ParticipantConnected(participant) => {
                let uid = directory.uid_for(&participant.identity().to_string());
                let _ = tx.send(EngineEvent::UserJoined {
                    uid,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }

            RoomEvent::ParticipantDisconnected(participant) => {
                if let Some(uid) = directory.forget(&participant.identity().to_string()) {
                    let _ = tx.send(EngineEvent::UserOffline {
                        uid,
                        reason: OFFLINE_REASON_QUIT,
                    });
                }
            }

            RoomEvent::Disconnected { reason } => {
                tracing::info!("room disconnected: {reason:?}");
                let _ = tx.send(EngineEvent::LeftChannel);
                break;
            }

            _ => {
                tracing::debug!("unhandled room event: {event:?}");
            }
        }
    }

    tracing::info!("room event mapping ended");
}
