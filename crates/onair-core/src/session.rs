use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::engine::{ChannelProfile, ClientRole, EngineEvent, PeerId, RtcEngine};
use crate::errors::CallError;
use crate::events::{CallEvent, CallEventListener, EventEmitter};
use crate::permissions::PermissionGate;
use crate::roster::PeerRoster;
use crate::view::{VideoLayout, compose_layout};

/// Lifecycle of one call session.
///
/// `InCall` is entered only when the engine confirms the join; `start_call`
/// itself never transitions the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    InCall,
}

/// Manages the lifecycle of a call session: owns the engine handle,
/// performs the init sequence, and applies engine events to the session
/// state and peer roster.
pub struct SessionController<E: RtcEngine> {
    config: SessionConfig,
    engine_settings: E::Settings,
    engine: Arc<Mutex<Option<Arc<E>>>>,
    state: Arc<Mutex<SessionState>>,
    roster: Arc<Mutex<PeerRoster>>,
    emitter: EventEmitter,
    gate: PermissionGate,
    session_id: Uuid,
}

impl<E: RtcEngine> SessionController<E> {
    pub fn new(config: SessionConfig, engine_settings: E::Settings, gate: PermissionGate) -> Self {
        Self {
            config,
            engine_settings,
            engine: Arc::new(Mutex::new(None)),
            state: Arc::new(Mutex::new(SessionState::Uninitialized)),
            roster: Arc::new(Mutex::new(PeerRoster::new())),
            emitter: EventEmitter::new(),
            gate,
            session_id: Uuid::new_v4(),
        }
    }

    /// Register a listener for session events.
    pub fn add_listener(&self, listener: Arc<dyn CallEventListener>) {
        self.emitter.add_listener(listener);
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Bring up and configure the engine.
    ///
    /// Runs the configuration steps in strict sequence, then starts the
    /// event consumer, so no engine event can arrive before a handler
    /// exists for it. On failure the controller surfaces
    /// `EngineInitFailed` and stays in `Initializing`; it does not
    /// silently become `Ready`.
    pub async fn init(&self) -> Result<(), CallError> {
        {
            let mut state = self.state.lock().await;
            if *state != SessionState::Uninitialized {
                tracing::warn!(session = %self.session_id, "init called in {:?}, ignoring", *state);
                return Ok(());
            }
            *state = SessionState::Initializing;
        }
        self.emitter
            .emit(CallEvent::SessionStateChanged(SessionState::Initializing));

        // Capture grants are requested up front, but engine setup does not
        // wait on the outcome: a denial degrades capture, it does not
        // block the session.
        let gate = self.gate.clone();
        let session_id = self.session_id;
        tokio::spawn(async move {
            let grants = gate.request_capture_capabilities();
            if grants.values().any(|granted| !granted) {
                tracing::warn!(session = %session_id, "capture capabilities partially denied");
            }
        });

        let (engine, events) = E::create(&self.engine_settings, self.config.application_id())
            .await
            .map_err(|e| CallError::EngineInitFailed(e.to_string()))?;
        engine
            .enable_video_capture()
            .await
            .map_err(|e| CallError::EngineInitFailed(e.to_string()))?;
        engine
            .start_local_preview()
            .await
            .map_err(|e| CallError::EngineInitFailed(e.to_string()))?;
        engine
            .set_channel_profile(ChannelProfile::LiveBroadcast)
            .await
            .map_err(|e| CallError::EngineInitFailed(e.to_string()))?;
        engine
            .set_local_role(ClientRole::Broadcaster)
            .await
            .map_err(|e| CallError::EngineInitFailed(e.to_string()))?;

        // The consumer must be running before start_call is reachable so
        // the join acknowledgment cannot be missed.
        self.spawn_event_loop(events);
        *self.engine.lock().await = Some(Arc::new(engine));

        *self.state.lock().await = SessionState::Ready;
        self.emitter
            .emit(CallEvent::SessionStateChanged(SessionState::Ready));
        tracing::info!(session = %self.session_id, "engine configured, session ready");
        Ok(())
    }

    /// Ask the engine to join the configured channel.
    ///
    /// Requires `Ready`; a session that is uninitialized, still
    /// initializing, or already in a call fails fast with
    /// `EngineNotReady` instead of querying an engine in the wrong state.
    /// The state moves to `InCall` only when `JoinChannelSuccess` arrives.
    pub async fn start_call(&self) -> Result<(), CallError> {
        {
            let state = self.state.lock().await;
            if *state != SessionState::Ready {
                return Err(CallError::EngineNotReady);
            }
        }
        let engine = self
            .engine
            .lock()
            .await
            .clone()
            .ok_or(CallError::EngineNotReady)?;

        engine
            .join_channel(
                self.config.access_token(),
                self.config.channel_name(),
                None,
                0,
            )
            .await
            .map_err(|e| CallError::JoinFailed(e.to_string()))?;

        tracing::info!(
            session = %self.session_id,
            channel = %self.config.channel_name(),
            "join requested"
        );
        Ok(())
    }

    /// Leave the channel and reset call state.
    ///
    /// Local state is authoritative here: the roster is cleared and the
    /// session returns to `Ready` as soon as the leave call completes,
    /// independent of anything the engine emits afterwards. Idempotent
    /// when no call is active.
    pub async fn end_call(&self) -> Result<(), CallError> {
        let engine = self
            .engine
            .lock()
            .await
            .clone()
            .ok_or(CallError::EngineNotReady)?;

        engine
            .leave_channel()
            .await
            .map_err(|e| CallError::LeaveFailed(e.to_string()))?;

        self.roster.lock().await.clear();
        let changed = {
            let mut state = self.state.lock().await;
            if *state == SessionState::Ready {
                false
            } else {
                *state = SessionState::Ready;
                true
            }
        };
        if changed {
            self.emitter
                .emit(CallEvent::SessionStateChanged(SessionState::Ready));
        }
        tracing::info!(session = %self.session_id, "call ended");
        Ok(())
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// Whether the engine has confirmed the local join.
    pub async fn is_joined(&self) -> bool {
        *self.state.lock().await == SessionState::InCall
    }

    /// Snapshot of the remote peers currently in the channel.
    pub async fn roster(&self) -> Vec<PeerId> {
        self.roster.lock().await.snapshot()
    }

    /// Render layout for the current state; `None` while not joined.
    pub async fn layout(&self) -> Option<VideoLayout> {
        let joined = self.is_joined().await;
        let roster = self.roster.lock().await.snapshot();
        compose_layout(self.config.channel_name(), joined, roster)
    }

    /// The engine handle, once init has completed. Shells use this to
    /// reach implementation-specific surfaces such as the local preview
    /// source.
    pub async fn engine(&self) -> Option<Arc<E>> {
        self.engine.lock().await.clone()
    }

    fn spawn_event_loop(&self, mut events: UnboundedReceiver<EngineEvent>) {
        let state = self.state.clone();
        let roster = self.roster.clone();
        let emitter = self.emitter.clone();
        let session_id = self.session_id;
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                apply_engine_event(event, &state, &roster, &emitter).await;
            }
            tracing::info!(session = %session_id, "engine event loop ended");
        });
    }
}

/// Apply one engine event to session state.
///
/// Runs on the single event-loop task, so every roster change is complete
/// before the lock is released and readers never see a torn update. Each
/// event touches only the field it names.
async fn apply_engine_event(
    event: EngineEvent,
    state: &Mutex<SessionState>,
    roster: &Mutex<PeerRoster>,
    emitter: &EventEmitter,
) {
    match event {
        EngineEvent::JoinChannelSuccess { channel, uid, elapsed_ms } => {
            tracing::info!(%channel, uid, elapsed_ms, "join confirmed by engine");
            *state.lock().await = SessionState::InCall;
            emitter.emit(CallEvent::SessionStateChanged(SessionState::InCall));
            emitter.emit(CallEvent::JoinConfirmed { channel, uid, elapsed_ms });
        }
        EngineEvent::UserJoined { uid, elapsed_ms } => {
            tracing::info!(uid, elapsed_ms, "user joined");
            if roster.lock().await.add(uid) {
                emitter.emit(CallEvent::PeerJoined(uid));
            }
        }
        EngineEvent::UserOffline { uid, reason } => {
            tracing::info!(uid, reason, "user offline");
            if roster.lock().await.remove(uid) {
                emitter.emit(CallEvent::PeerLeft(uid));
            }
        }
        EngineEvent::LeftChannel => {
            // end_call already applied the transition; the engine's own
            // notion of having left carries no local state.
            tracing::debug!("engine reported channel left");
        }
    }
}
