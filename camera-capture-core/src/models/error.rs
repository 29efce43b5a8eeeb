use thiserror::Error;

use super::camera_models::CameraPosition;

/// Errors that can occur while configuring or running a capture session.
///
/// Every variant leaves the session in a fully committed or fully rolled-back
/// state; none of them implies a half-built capture graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("no capture device at position {position}")]
    DeviceNotFound { position: CameraPosition },

    #[error("attach failed: {0}")]
    AttachFailure(String),

    #[error("orientation cannot be applied to video output")]
    InvalidOrientation,

    #[error("quality preset rejected: {0}")]
    PresetRejected(String),

    #[error("frame production failed: {0}")]
    ProductionFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("configuration queue closed")]
    QueueClosed,

    #[error("timeout")]
    Timeout,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Whether the session may succeed if the caller re-invokes the operation.
    ///
    /// Nothing in the core retries on its own.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound { .. }
                | Self::AttachFailure(_)
                | Self::PresetRejected(_)
                | Self::ProductionFailed(_)
                | Self::Timeout
        )
    }
}
