use std::sync::Arc;

use crate::engine::PeerId;
use crate::session::SessionState;

/// Events emitted by the core to UI listeners.
#[derive(Debug, Clone)]
pub enum CallEvent {
    SessionStateChanged(SessionState),
    /// The engine acknowledged the local join. `channel` and `uid` echo
    /// what the engine reported, not what was requested.
    JoinConfirmed { channel: String, uid: PeerId, elapsed_ms: u64 },
    PeerJoined(PeerId),
    PeerLeft(PeerId),
}

/// Trait for receiving events from the core.
/// Implementations must be Send + Sync (called from tokio tasks).
pub trait CallEventListener: Send + Sync {
    fn on_event(&self, event: CallEvent);
}

/// Internal event emitter that dispatches to registered listeners.
#[derive(Clone)]
pub struct EventEmitter {
    listeners: Arc<std::sync::RwLock<Vec<Arc<dyn CallEventListener>>>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self {
            listeners: Arc::new(std::sync::RwLock::new(Vec::new())),
        }
    }

    pub fn add_listener(&self, listener: Arc<dyn CallEventListener>) {
        self.listeners.write().unwrap().push(listener);
    }

    pub fn emit(&self, event: CallEvent) {
        let listeners = self.listeners.read().unwrap();
        for listener in listeners.iter() {
            listener.on_event(event.clone());
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}
