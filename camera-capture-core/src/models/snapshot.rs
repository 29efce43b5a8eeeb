use serde::{Deserialize, Serialize};

use super::camera_models::{
    CameraPosition, CaptureDevice, CaptureDiagnostics, DeviceOrientation, OutputTransform, QualityPreset,
};
use super::state::{AuthorizationState, SessionState};

/// Point-in-time view of a capturer's committed configuration.
///
/// Serializable for host applications that surface session status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub taken_at: String,
    pub state: SessionState,
    pub authorization: AuthorizationState,
    pub camera_position: CameraPosition,
    pub quality_preset: QualityPreset,
    pub device_orientation: DeviceOrientation,
    pub output_transform: OutputTransform,
    pub active_device: Option<CaptureDevice>,
    pub diagnostics: CaptureDiagnostics,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
