use std::fmt;

use serde::{Deserialize, Serialize};

/// Physical side of the device a camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    #[default]
    Front,
    Back,
}

impl fmt::Display for CameraPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// Orientation reported by the host's orientation-event source.
///
/// `Other` covers face-up, face-down and unknown readings. It is never applied
/// to the output connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    Other,
}

impl DeviceOrientation {
    /// Whether this reading maps onto a video rotation.
    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Rotation applied to frames leaving the output connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoRotation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Rotation and mirroring of the live output connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputTransform {
    pub rotation: VideoRotation,
    pub mirrored: bool,
}

/// Capture resolution/bitrate tier.
///
/// The identifier is owned by the platform backend; the core only passes it
/// through. The named constructors cover the tiers most backends understand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QualityPreset(String);

impl QualityPreset {
    pub const LOW: &'static str = "low";
    pub const MEDIUM: &'static str = "medium";
    pub const HIGH: &'static str = "high";
    pub const PHOTO: &'static str = "photo";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn low() -> Self {
        Self::new(Self::LOW)
    }

    pub fn medium() -> Self {
        Self::new(Self::MEDIUM)
    }

    pub fn high() -> Self {
        Self::new(Self::HIGH)
    }

    pub fn photo() -> Self {
        Self::new(Self::PHOTO)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Default for QualityPreset {
    fn default() -> Self {
        Self::medium()
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of media a capture device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// A capture device reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDevice {
    pub id: String,
    pub name: String,
    pub kind: MediaKind,
    /// `None` for devices without a fixed mounting side (external webcams).
    pub position: Option<CameraPosition>,
}

impl CaptureDevice {
    pub fn video(id: impl Into<String>, name: impl Into<String>, position: Option<CameraPosition>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: MediaKind::Video,
            position,
        }
    }
}

/// Counters for debugging capture sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDiagnostics {
    pub production_activations: u64,
    pub input_attaches: u64,
    pub output_attaches: u64,
    pub transactions_committed: u64,
    pub transactions_rolled_back: u64,
    pub frames_delivered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_other_is_not_applicable() {
        assert!(DeviceOrientation::Portrait.is_applicable());
        assert!(DeviceOrientation::LandscapeLeft.is_applicable());
        assert!(!DeviceOrientation::Other.is_applicable());
    }

    #[test]
    fn preset_serializes_as_plain_string() {
        let json = serde_json::to_string(&QualityPreset::high()).unwrap();
        assert_eq!(json, "\"high\"");

        let preset: QualityPreset = serde_json::from_str("\"hd1920x1080\"").unwrap();
        assert_eq!(preset.as_str(), "hd1920x1080");
    }

    #[test]
    fn blank_preset_is_empty() {
        assert!(QualityPreset::new("  ").is_empty());
        assert!(!QualityPreset::default().is_empty());
    }
}
