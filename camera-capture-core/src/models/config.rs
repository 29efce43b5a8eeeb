use serde::{Deserialize, Serialize};

use super::camera_models::{CameraPosition, DeviceOrientation, QualityPreset};
use super::error::CaptureError;

/// Initial settings for a frame capturer.
///
/// These seed the committed values; afterwards the setters on the capturer are
/// the only way to change them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapturerConfiguration {
    /// Camera to resolve on the first configure (default: front).
    pub camera_position: CameraPosition,

    /// Preset applied to the output on configure (default: medium).
    pub quality_preset: QualityPreset,

    /// Orientation used until the first orientation event (default: portrait).
    pub device_orientation: DeviceOrientation,

    /// Thread name of the configuration worker.
    pub configuration_label: String,

    /// Thread name of the frame delivery worker.
    pub delivery_label: String,
}

impl CapturerConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !self.device_orientation.is_applicable() {
            return Err("initial device orientation must be portrait or landscape".into());
        }
        if self.quality_preset.is_empty() {
            return Err("quality preset must not be empty".into());
        }
        if self.configuration_label.trim().is_empty() || self.delivery_label.trim().is_empty() {
            return Err("worker labels must not be empty".into());
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CaptureError::InvalidConfiguration(format!("failed to parse configuration: {}", e)))?;
        config.validate().map_err(CaptureError::InvalidConfiguration)?;
        Ok(config)
    }
}

impl Default for CapturerConfiguration {
    fn default() -> Self {
        Self {
            camera_position: CameraPosition::Front,
            quality_preset: QualityPreset::medium(),
            device_orientation: DeviceOrientation::Portrait,
            configuration_label: "video-configuration".into(),
            delivery_label: "video-data-output".into(),
        }
    }
}
