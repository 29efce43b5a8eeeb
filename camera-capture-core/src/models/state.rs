use serde::{Deserialize, Serialize};

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// unconfigured → configuring → configured → running ↔ stopped
///       ↑             │
///       └─────────────┘ (permission denied, device not found, rollback)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Unconfigured,
    Configuring,
    Configured,
    Running,
    Stopped,
}

impl SessionState {
    /// Whether a capture graph is live.
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured | Self::Running | Self::Stopped)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Camera authorization as tracked by the permission gate.
///
/// ```text
/// unknown → requesting → granted / denied
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationState {
    #[default]
    Unknown,
    Requesting,
    Granted,
    Denied,
}

impl AuthorizationState {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Granted | Self::Denied)
    }
}
