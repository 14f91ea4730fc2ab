use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::CallError;

/// Capabilities required before media can flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureCapability {
    Camera,
    Microphone,
}

impl CaptureCapability {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureCapability::Camera => "camera",
            CaptureCapability::Microphone => "microphone",
        }
    }
}

/// Per-capability grant results.
pub type GrantMap = HashMap<CaptureCapability, bool>;

/// Platform hook that performs the actual grant request.
///
/// Platform shells own the OS permission APIs, so shells on platforms with
/// runtime grants (Android, iOS) inject their own requester; the call
/// blocks until the user has responded.
pub trait CapabilityRequester: Send + Sync {
    fn request(&self, capabilities: &[CaptureCapability]) -> GrantMap;
}

/// Requester for platforms where the OS pre-grants capture capabilities;
/// resolves immediately with everything granted.
pub struct PreGrantedCapabilities;

impl CapabilityRequester for PreGrantedCapabilities {
    fn request(&self, capabilities: &[CaptureCapability]) -> GrantMap {
        capabilities.iter().map(|c| (*c, true)).collect()
    }
}

/// Requests the capture capabilities a call needs.
#[derive(Clone)]
pub struct PermissionGate {
    requester: Arc<dyn CapabilityRequester>,
}

impl PermissionGate {
    pub fn new(requester: Arc<dyn CapabilityRequester>) -> Self {
        Self { requester }
    }

    /// The gate for the build target: pre-granted on desktop platforms.
    /// Mobile shells construct the gate with their own requester instead.
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    pub fn platform_default() -> Self {
        Self::new(Arc::new(PreGrantedCapabilities))
    }

    /// Request camera and microphone grants.
    pub fn request_capture_capabilities(&self) -> GrantMap {
        let grants = self.requester.request(&[
            CaptureCapability::Camera,
            CaptureCapability::Microphone,
        ]);
        for (capability, granted) in &grants {
            tracing::info!("capture capability {}: granted={granted}", capability.name());
        }
        grants
    }

    /// Request grants and fail with `PermissionDenied` if any is refused.
    /// For shells that want to gate their UI on the outcome; the session
    /// controller itself proceeds regardless.
    pub fn ensure_capture_granted(&self) -> Result<GrantMap, CallError> {
        let grants = self.request_capture_capabilities();
        let denied: Vec<&'static str> = grants
            .iter()
            .filter(|(_, granted)| !**granted)
            .map(|(capability, _)| capability.name())
            .collect();
        if denied.is_empty() {
            Ok(grants)
        } else {
            Err(CallError::PermissionDenied(denied.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenyCamera;

    impl CapabilityRequester for DenyCamera {
        fn request(&self, capabilities: &[CaptureCapability]) -> GrantMap {
            capabilities
                .iter()
                .map(|c| (*c, *c != CaptureCapability::Camera))
                .collect()
        }
    }

    #[test]
    fn pre_granted_resolves_everything() {
        let gate = PermissionGate::new(Arc::new(PreGrantedCapabilities));
        let grants = gate.request_capture_capabilities();
        assert_eq!(grants.len(), 2);
        assert!(grants.values().all(|g| *g));
    }

    #[test]
    fn ensure_granted_passes_when_all_granted() {
        let gate = PermissionGate::new(Arc::new(PreGrantedCapabilities));
        assert!(gate.ensure_capture_granted().is_ok());
    }

    #[test]
    fn denied_capability_surfaces_as_permission_denied() {
        let gate = PermissionGate::new(Arc::new(DenyCamera));
        let err = gate.ensure_capture_granted().unwrap_err();
        match err {
            CallError::PermissionDenied(msg) => assert!(msg.contains("camera")),
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }
}
