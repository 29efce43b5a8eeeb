use crate::models::camera_models::{CameraPosition, DeviceOrientation, QualityPreset};
use crate::models::error::CaptureError;
use crate::models::state::SessionState;
use crate::session::queue::OperationHandle;

/// Main capture session interface exposed to the host application.
///
/// Every mutating call is queued and returns immediately. The returned handle
/// can be dropped (fire-and-forget) or waited on for the operation's result.
pub trait CaptureSession: Send + Sync {
    /// State as of the last completed operation.
    fn state(&self) -> SessionState;

    /// Build the capture graph. Transitions: unconfigured → configuring → configured.
    fn configure(&self) -> OperationHandle<()>;

    /// Begin frame production, configuring first if needed.
    /// Transitions: configured/stopped → running.
    fn start(&self) -> OperationHandle<()>;

    /// Halt frame production. Transitions: running → stopped.
    fn stop(&self) -> OperationHandle<()>;

    /// Switch cameras, swapping the input atomically when configured.
    fn set_camera_position(&self, position: CameraPosition) -> OperationHandle<()>;

    /// Change the capture tier on the live output.
    fn set_quality_preset(&self, preset: QualityPreset) -> OperationHandle<()>;

    /// Apply a new orientation. `Other` is rejected before anything is queued.
    fn set_device_orientation(&self, orientation: DeviceOrientation) -> Result<OperationHandle<()>, CaptureError>;
}
