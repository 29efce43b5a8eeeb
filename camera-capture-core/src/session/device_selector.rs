use std::sync::Arc;

use crate::models::camera_models::{CameraPosition, CaptureDevice, MediaKind};
use crate::models::error::CaptureError;
use crate::traits::capture_provider::DeviceProvider;

/// Resolves a camera position to a concrete capture device.
#[derive(Clone)]
pub struct DeviceSelector {
    provider: Arc<dyn DeviceProvider>,
}

impl DeviceSelector {
    pub fn new(provider: Arc<dyn DeviceProvider>) -> Self {
        Self { provider }
    }

    /// First video device mounted at `position`.
    pub fn resolve(&self, position: CameraPosition) -> Result<CaptureDevice, CaptureError> {
        let devices = self.provider.devices(MediaKind::Video).map_err(|e| {
            log::warn!("device enumeration failed: {}", e);
            CaptureError::DeviceNotFound { position }
        })?;

        devices
            .into_iter()
            .find(|d| d.kind == MediaKind::Video && d.position == Some(position))
            .ok_or_else(|| {
                log::error!("no {} camera available", position);
                CaptureError::DeviceNotFound { position }
            })
    }

    /// All video devices, for camera pickers.
    pub fn available_devices(&self) -> Result<Vec<CaptureDevice>, CaptureError> {
        self.provider.devices(MediaKind::Video)
    }
}
