use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallError {
    /// A capture capability was refused by the platform. Non-fatal: the
    /// call proceeds without the denied capability.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    /// An engine configuration step failed during init. The controller
    /// stays in `Initializing` and the session cannot progress.
    #[error("engine init failed: {0}")]
    EngineInitFailed(String),
    /// `start_call`/`end_call` was invoked without a ready engine.
    #[error("engine not ready")]
    EngineNotReady,
    #[error("join failed: {0}")]
    JoinFailed(String),
    #[error("leave failed: {0}")]
    LeaveFailed(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("token request failed: {0}")]
    TokenRequest(String),
}
