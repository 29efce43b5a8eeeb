//! Virtual camera enumeration.
//!
//! Advertises a fixed set of cameras and builds inputs and outputs that share
//! one `StreamFormat`, the way a platform session shares a single connection
//! between its input and its data output.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use camera_capture_core::models::camera_models::{CameraPosition, CaptureDevice, MediaKind};
use camera_capture_core::models::error::CaptureError;
use camera_capture_core::traits::capture_provider::{CaptureInput, CaptureOutput, DeviceProvider};

use crate::camera_input::VirtualCameraInput;
use crate::video_output::{StreamFormat, VirtualVideoOutput};

/// Frame rate used when none is given.
pub const DEFAULT_FPS: u32 = 30;

pub struct VirtualDeviceProvider {
    devices: Vec<CaptureDevice>,
    fps: u32,
    format: Arc<RwLock<StreamFormat>>,
    unplugged: Mutex<HashSet<String>>,
}

impl VirtualDeviceProvider {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self {
            devices,
            fps: DEFAULT_FPS,
            format: Arc::new(RwLock::new(StreamFormat::default())),
            unplugged: Mutex::new(HashSet::new()),
        }
    }

    /// A front camera `virtual-front` and a back camera `virtual-back`.
    pub fn phone() -> Self {
        Self::new(vec![
            CaptureDevice::video("virtual-front", "Virtual Front Camera", Some(CameraPosition::Front)),
            CaptureDevice::video("virtual-back", "Virtual Back Camera", Some(CameraPosition::Back)),
        ])
    }

    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps.max(1);
        self
    }

    /// Settings most recently applied by an output.
    pub fn stream_format(&self) -> StreamFormat {
        *self.format.read()
    }

    /// Hide a device from enumeration and refuse new inputs for it.
    pub fn unplug(&self, device_id: &str) {
        log::info!("virtual camera {} unplugged", device_id);
        self.unplugged.lock().insert(device_id.to_string());
    }

    pub fn replug(&self, device_id: &str) {
        self.unplugged.lock().remove(device_id);
    }

    fn is_plugged(&self, device_id: &str) -> bool {
        !self.unplugged.lock().contains(device_id)
    }
}

impl DeviceProvider for VirtualDeviceProvider {
    fn devices(&self, kind: MediaKind) -> Result<Vec<CaptureDevice>, CaptureError> {
        Ok(self
            .devices
            .iter()
            .filter(|d| d.kind == kind && self.is_plugged(&d.id))
            .cloned()
            .collect())
    }

    fn create_input(&self, device: &CaptureDevice) -> Result<Box<dyn CaptureInput>, CaptureError> {
        let known = self.devices.iter().any(|d| d.id == device.id);
        if !known || !self.is_plugged(&device.id) {
            return Err(CaptureError::AttachFailure(format!("{} is not connected", device.id)));
        }
        Ok(Box::new(VirtualCameraInput::new(
            device.clone(),
            Arc::clone(&self.format),
            self.fps,
        )))
    }

    fn create_output(&self) -> Result<Box<dyn CaptureOutput>, CaptureError> {
        Ok(Box::new(VirtualVideoOutput::new(Arc::clone(&self.format))))
    }
}
