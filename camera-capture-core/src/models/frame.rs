use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::camera_models::{CameraPosition, CaptureDevice, OutputTransform, QualityPreset};

/// Pixel layout of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Bgra8,
    Rgb8,
    Yuyv,
    Nv12,
}

impl PixelFormat {
    /// Byte length of a tightly packed `width` x `height` buffer.
    pub fn buffer_len(&self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            Self::Bgra8 => pixels * 4,
            Self::Rgb8 => pixels * 3,
            Self::Yuyv => pixels * 2,
            Self::Nv12 => pixels * 3 / 2,
        }
    }
}

/// A frame as produced by a capture input, before it reaches the consumer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub data: Vec<u8>,
    pub captured_at: DateTime<Utc>,
}

impl RawFrame {
    /// Creates a frame stamped with the current time.
    pub fn new(width: u32, height: u32, pixel_format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixel_format,
            data,
            captured_at: Utc::now(),
        }
    }
}

/// A frame delivered to the consumer.
///
/// Carries the connection settings that were live when it was captured.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Per-session delivery counter, starting at 0.
    pub sequence: u64,
    pub device: Arc<CaptureDevice>,
    pub transform: OutputTransform,
    pub preset: QualityPreset,
    pub raw: RawFrame,
}

impl Frame {
    pub fn position(&self) -> Option<CameraPosition> {
        self.device.position
    }

    pub fn width(&self) -> u32 {
        self.raw.width
    }

    pub fn height(&self) -> u32 {
        self.raw.height
    }

    pub fn data(&self) -> &[u8] {
        &self.raw.data
    }
}
