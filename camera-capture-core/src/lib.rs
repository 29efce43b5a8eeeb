//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides serialized session configuration, permission gating, camera
//! selection, orientation/mirroring policy and frame delivery. Platform
//! backends implement `AuthorizationProvider` and `DeviceProvider` and plug
//! into the generic `FrameCapturer`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← AuthorizationProvider, DeviceProvider, CaptureInput/Output, CaptureDelegate, CaptureSession
//! ├── models/       ← CaptureError, SessionState, CapturerConfiguration, Frame, SessionSnapshot, etc.
//! ├── policy/       ← OrientationMirrorPolicy
//! └── session/      ← FrameCapturer, ConfigurationQueue, SessionConfigurator, CaptureGraph, FrameSink
//! ```
//!
//! ## Threading
//!
//! Every configuration operation runs on one named worker thread, in
//! submission order. Frames are delivered on a separate worker so preset and
//! orientation changes never block delivery; camera switches do.

pub mod models;
pub mod policy;
pub mod session;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::camera_models::{
    CameraPosition, CaptureDevice, CaptureDiagnostics, DeviceOrientation, MediaKind, OutputTransform, QualityPreset,
    VideoRotation,
};
pub use models::config::CapturerConfiguration;
pub use models::error::CaptureError;
pub use models::frame::{Frame, PixelFormat, RawFrame};
pub use models::snapshot::SessionSnapshot;
pub use models::state::{AuthorizationState, SessionState};
pub use policy::orientation_mirror::OrientationMirrorPolicy;
pub use session::capturer::FrameCapturer;
pub use session::queue::{ConfigurationQueue, OperationHandle, SuspendGate};
pub use traits::authorization::{AuthorizationCallback, AuthorizationProvider, AuthorizationStatus};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::capture_provider::{CaptureInput, CaptureOutput, DeviceProvider, FrameCallback};
pub use traits::capture_session::CaptureSession;
