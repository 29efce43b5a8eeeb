use crate::models::error::CaptureError;
use crate::models::frame::Frame;
use crate::models::state::SessionState;

/// Consumer of captured frames and session notifications.
///
/// `on_frame` is called on the frame delivery thread, once per frame and in
/// capture order. State and error notifications come from the configuration
/// thread. Neither is a UI thread; implementations marshal if they need to
/// and must not block the delivery thread indefinitely.
pub trait CaptureDelegate: Send + Sync {
    /// Called for every frame the live output delivers.
    fn on_frame(&self, frame: &Frame);

    /// Called when the session state changes.
    fn on_state_changed(&self, _state: SessionState) {}

    /// Called when a queued operation fails.
    fn on_error(&self, _error: &CaptureError) {}
}
