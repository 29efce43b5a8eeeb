use std::sync::Arc;

use crate::models::camera_models::{CaptureDevice, MediaKind, QualityPreset, VideoRotation};
use crate::models::error::CaptureError;
use crate::models::frame::RawFrame;

/// Callback invoked when an input has a frame available.
pub type FrameCallback = Arc<dyn Fn(RawFrame) + Send + Sync + 'static>;

/// Platform capability for enumerating cameras and building graph nodes.
pub trait DeviceProvider: Send + Sync {
    /// Devices of `kind` currently available for capture.
    fn devices(&self, kind: MediaKind) -> Result<Vec<CaptureDevice>, CaptureError>;

    /// Open an input node for `device`.
    fn create_input(&self, device: &CaptureDevice) -> Result<Box<dyn CaptureInput>, CaptureError>;

    /// Create a fresh video data output node.
    fn create_output(&self) -> Result<Box<dyn CaptureOutput>, CaptureError>;
}

/// An input node bound to one capture device.
///
/// Dropping the input releases the device.
pub trait CaptureInput: Send {
    fn device(&self) -> &CaptureDevice;

    /// Begin producing frames, delivering each via `callback`.
    ///
    /// The callback fires on a thread owned by the input; keep work minimal.
    fn start(&mut self, callback: FrameCallback) -> Result<(), CaptureError>;

    /// Halt production. No callback fires after this returns.
    fn stop(&mut self) -> Result<(), CaptureError>;
}

/// The video data output node and its connection settings.
pub trait CaptureOutput: Send {
    fn supports_rotation(&self) -> bool;

    fn supports_mirroring(&self) -> bool;

    fn set_rotation(&mut self, rotation: VideoRotation);

    fn set_mirrored(&mut self, mirrored: bool);

    /// Switch the capture tier. On error the previous preset stays active.
    fn apply_preset(&mut self, preset: &QualityPreset) -> Result<(), CaptureError>;
}
