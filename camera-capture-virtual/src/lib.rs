//! # camera-capture-virtual
//!
//! Synthetic camera backend for camera-capture-kit.
//!
//! Provides:
//! - `VirtualDeviceProvider`: front/back virtual cameras producing a test pattern
//! - `VirtualCameraInput`: per-device frame producer on its own thread
//! - `VirtualVideoOutput`: preset table and rotation/mirroring settings
//! - `VirtualAuthorization`: simulated consent prompt
//!
//! Useful on hosts without camera hardware and for exercising the session
//! core end to end.
//!
//! ## Usage
//! ```ignore
//! use std::sync::Arc;
//! use camera_capture_core::{CapturerConfiguration, CaptureSession, FrameCapturer};
//! use camera_capture_virtual::{VirtualAuthorization, VirtualDeviceProvider};
//!
//! let capturer = FrameCapturer::new(
//!     CapturerConfiguration::default(),
//!     Arc::new(VirtualAuthorization::granted()),
//!     Arc::new(VirtualDeviceProvider::phone()),
//! )?;
//! capturer.start().wait()?;
//! ```

pub mod camera_input;
pub mod device_enumerator;
pub mod pattern;
pub mod permissions;
pub mod video_output;

pub use camera_input::VirtualCameraInput;
pub use device_enumerator::VirtualDeviceProvider;
pub use permissions::VirtualAuthorization;
pub use video_output::{Resolution, StreamFormat, VirtualVideoOutput};
