use crate::models::camera_models::{CameraPosition, DeviceOrientation, OutputTransform, VideoRotation};
use crate::traits::capture_provider::CaptureOutput;

/// Maps device orientation and camera position onto the output transform.
///
/// Landscape readings are swapped: the sensor is mounted rotated relative to
/// the screen, so a device held landscape-left needs landscape-right video.
/// Front cameras are mirrored so the preview behaves like a mirror.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientationMirrorPolicy;

impl OrientationMirrorPolicy {
    /// Rotation for `orientation`, or `None` for face-up/face-down/unknown.
    pub fn rotation(orientation: DeviceOrientation) -> Option<VideoRotation> {
        match orientation {
            DeviceOrientation::Portrait => Some(VideoRotation::Portrait),
            DeviceOrientation::PortraitUpsideDown => Some(VideoRotation::PortraitUpsideDown),
            DeviceOrientation::LandscapeLeft => Some(VideoRotation::LandscapeRight),
            DeviceOrientation::LandscapeRight => Some(VideoRotation::LandscapeLeft),
            DeviceOrientation::Other => None,
        }
    }

    pub fn mirrored(position: CameraPosition) -> bool {
        position == CameraPosition::Front
    }

    pub fn transform(orientation: DeviceOrientation, position: CameraPosition) -> Option<OutputTransform> {
        Some(OutputTransform {
            rotation: Self::rotation(orientation)?,
            mirrored: Self::mirrored(position),
        })
    }

    /// Push `transform` onto an output connection, skipping whatever the
    /// connection does not support.
    pub fn apply(output: &mut dyn CaptureOutput, transform: OutputTransform) {
        if output.supports_rotation() {
            output.set_rotation(transform.rotation);
        } else {
            log::debug!("output connection does not support rotation");
        }
        if output.supports_mirroring() {
            output.set_mirrored(transform.mirrored);
        }
    }
}
