//! Virtual video data output.
//!
//! Holds the connection settings shared with whichever input is attached:
//! frame size follows the quality preset, and portrait rotations swap the
//! sensor's landscape dimensions.

use std::sync::Arc;

use parking_lot::RwLock;

use camera_capture_core::models::camera_models::{QualityPreset, VideoRotation};
use camera_capture_core::models::error::CaptureError;
use camera_capture_core::traits::capture_provider::CaptureOutput;

/// Sensor dimensions, always landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Dimensions for the presets this backend understands.
    pub fn for_preset(preset: &QualityPreset) -> Option<Self> {
        let (width, height) = match preset.as_str() {
            QualityPreset::LOW => (192, 144),
            QualityPreset::MEDIUM => (480, 360),
            QualityPreset::HIGH => (1280, 720),
            QualityPreset::PHOTO => (1920, 1080),
            _ => return None,
        };
        Some(Self { width, height })
    }
}

/// Connection settings as last applied to the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub resolution: Resolution,
    pub rotation: VideoRotation,
    pub mirrored: bool,
}

impl Default for StreamFormat {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 480,
                height: 360,
            },
            rotation: VideoRotation::Portrait,
            mirrored: false,
        }
    }
}

impl StreamFormat {
    /// Width and height of delivered frames.
    pub fn frame_size(&self) -> (u32, u32) {
        let Resolution { width, height } = self.resolution;
        match self.rotation {
            VideoRotation::Portrait | VideoRotation::PortraitUpsideDown => (height, width),
            VideoRotation::LandscapeLeft | VideoRotation::LandscapeRight => (width, height),
        }
    }
}

pub struct VirtualVideoOutput {
    format: Arc<RwLock<StreamFormat>>,
}

impl VirtualVideoOutput {
    pub fn new(format: Arc<RwLock<StreamFormat>>) -> Self {
        Self { format }
    }

    pub fn format(&self) -> StreamFormat {
        *self.format.read()
    }
}

impl CaptureOutput for VirtualVideoOutput {
    fn supports_rotation(&self) -> bool {
        true
    }

    fn supports_mirroring(&self) -> bool {
        true
    }

    fn set_rotation(&mut self, rotation: VideoRotation) {
        self.format.write().rotation = rotation;
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.format.write().mirrored = mirrored;
    }

    fn apply_preset(&mut self, preset: &QualityPreset) -> Result<(), CaptureError> {
        let resolution = Resolution::for_preset(preset).ok_or_else(|| {
            log::warn!("virtual output does not support preset {}", preset);
            CaptureError::PresetRejected(preset.to_string())
        })?;
        self.format.write().resolution = resolution;
        log::debug!(
            "virtual output preset {} ({}x{})",
            preset,
            resolution.width,
            resolution.height
        );
        Ok(())
    }
}
