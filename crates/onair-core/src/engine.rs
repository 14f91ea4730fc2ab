//! Contract consumed by the session controller to drive a real-time
//! communication engine. The controller owns exactly one engine handle,
//! created during init and reused across calls; implementations live in
//! their own crate (`onair-engine` for the LiveKit-backed one) so the core
//! never links against an RTC stack.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Opaque numeric identifier for a remote participant. Unique for the
/// lifetime of one channel membership; a peer that leaves and rejoins may
/// come back under a different id.
pub type PeerId = u64;

/// The peer left the channel voluntarily.
pub const OFFLINE_REASON_QUIT: u32 = 0;
/// The peer's connection dropped.
pub const OFFLINE_REASON_DROPPED: u32 = 1;
/// The peer switched to the audience role and stopped publishing.
pub const OFFLINE_REASON_BECAME_AUDIENCE: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelProfile {
    /// Symmetric conferencing: every participant publishes.
    Communication,
    /// One-to-many streaming: only broadcasters publish.
    LiveBroadcast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientRole {
    Broadcaster,
    Audience,
}

/// Events delivered by the engine on the receiver handed out by
/// [`RtcEngine::create`].
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The local join was acknowledged by the engine. The sole trigger
    /// for the session entering `InCall`; never emitted optimistically.
    JoinChannelSuccess { channel: String, uid: PeerId, elapsed_ms: u64 },
    /// A remote participant joined the channel.
    UserJoined { uid: PeerId, elapsed_ms: u64 },
    /// A remote participant left the channel or dropped offline.
    UserOffline { uid: PeerId, reason: u32 },
    /// The local participant left the channel. Informational only: the
    /// controller applies the leave transition itself on `end_call`.
    LeftChannel,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine create failed: {0}")]
    Create(String),
    #[error("engine configure failed: {0}")]
    Configure(String),
    #[error("channel join failed: {0}")]
    Join(String),
    #[error("channel leave failed: {0}")]
    Leave(String),
}

/// The real-time communication engine the session controller drives.
///
/// `create` hands back the engine together with its event stream; the
/// controller drains that stream from a single task, which is how event
/// listeners get registered exactly once. Configuration calls are made in
/// strict sequence during init, before any join is reachable.
pub trait RtcEngine: Send + Sync + Sized + 'static {
    /// Implementation-specific settings (server endpoint etc.), opaque to
    /// the controller.
    type Settings: Send + Sync;

    fn create(
        settings: &Self::Settings,
        app_id: &str,
    ) -> impl Future<Output = Result<(Self, UnboundedReceiver<EngineEvent>), EngineError>> + Send;

    fn enable_video_capture(&self) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn start_local_preview(&self) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn set_channel_profile(
        &self,
        profile: ChannelProfile,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn set_local_role(
        &self,
        role: ClientRole,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Ask the engine to join `channel`. Completion of this call means the
    /// request was accepted, not that the join happened; the engine
    /// confirms with [`EngineEvent::JoinChannelSuccess`]. `uid` 0 lets the
    /// engine assign the local id.
    fn join_channel(
        &self,
        token: &str,
        channel: &str,
        info: Option<&str>,
        uid: PeerId,
    ) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn leave_channel(&self) -> impl Future<Output = Result<(), EngineError>> + Send;
}
