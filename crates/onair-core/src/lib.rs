//! Call-session core for a one-screen video-chat client.
//!
//! Owns the session state machine and the peer roster; drives a real-time
//! communication engine through the [`engine::RtcEngine`] contract without
//! linking against any RTC stack. Consumed by platform shells.

pub mod auth;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod permissions;
pub mod roster;
pub mod session;
pub mod view;

pub use auth::TokenService;
pub use config::SessionConfig;
pub use engine::{ChannelProfile, ClientRole, EngineError, EngineEvent, PeerId, RtcEngine};
pub use errors::CallError;
pub use events::{CallEvent, CallEventListener, EventEmitter};
pub use permissions::{
    CapabilityRequester, CaptureCapability, GrantMap, PermissionGate, PreGrantedCapabilities,
};
pub use roster::PeerRoster;
pub use session::{SessionController, SessionState};
pub use view::{VideoLayout, compose_layout};
